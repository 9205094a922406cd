use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use content_forge::config::DEFAULT_CONFIG_FILE;
use content_forge::host::{ActionNotification, MemoryHost};
use content_forge::package::DirectoryPackageSource;
use content_forge::{Framework, FrameworkConfig, InjectReport, LoadError};

/// Load every package and inject it into an in-memory host, reporting any
/// definition that fails.
#[derive(Parser, Debug)]
#[command(name = "content-forge")]
#[command(about = "Validate content packages against an in-memory host")]
#[command(version)]
struct Cli {
    /// Framework configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Packages directory (overrides the config)
    #[arg(long)]
    packages: Option<PathBuf>,
}

fn init_tracing(extra: Option<&str>) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "content_forge=info".parse() {
        filter = filter.add_directive(directive);
    }
    let mut rejected = None;
    if let Some(extra) = extra {
        match extra.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => rejected = Some(format!("{}: {}", extra, e)),
        }
    }

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(rejected) = rejected {
        warn!("Ignoring invalid log filter {}", rejected);
    }
}

/// Load the config under a temporary subscriber. The real one depends on the
/// config's log filter, so it cannot be installed yet.
fn load_config<W>(path: &Path, writer: W) -> Result<FrameworkConfig, LoadError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt().with_writer(writer).finish();
    tracing::subscriber::with_default(bootstrap, || FrameworkConfig::load(path))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(&cli.config, std::io::stdout);
    let log_filter = loaded.as_ref().ok().and_then(|c| c.log_filter.clone());
    init_tracing(log_filter.as_deref());

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config {:?}: {}", cli.config, e);
            return ExitCode::from(2);
        }
    };

    let packages_dir = cli.packages.unwrap_or_else(|| config.packages_dir.clone());
    let source = DirectoryPackageSource::new(packages_dir, &config.language);

    let mut framework = Framework::new(config.ids);
    let discovered = framework.discover(&source);

    let mut host = MemoryHost::seeded();
    let mut total = InjectReport::default();
    total.merge(framework.inject_content(&mut host.tables()));
    let icons = framework.resolve_deferred_assets(&mut host.items);
    if icons > 0 {
        info!("Resolved {} deferred icon(s)", icons);
    }

    // A new session: the host rebuilds its tables and announces the load
    host.reload_tables();
    let (mut tables, quests) = host.tables_and_quests();
    let action = framework.on_action(&ActionNotification::session_loaded(), &mut tables, quests);
    match action.reinjected {
        Some(report) => {
            info!("Re-injection after reload: {}", report);
            total.failed += report.failed;
        }
        None => info!("Nothing to re-inject after reload"),
    }

    let unlocked = framework.unlock_recipes(&mut host.recipe_book, &host.recipes);

    info!(
        "{} package(s), {} definition(s), {} rejected; {} recipe(s) unlocked",
        discovered.packages, discovered.registered, discovered.rejected, unlocked
    );
    info!("Result: {}", total);

    if total.has_failures() || discovered.rejected > 0 {
        error!("{} definition(s) failed", total.failed + discovered.rejected);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_config_load_is_logged() {
        let temp_dir = TempDir::new().unwrap();
        let captured = Captured::default();
        let writer = captured.clone();

        let absent = temp_dir.path().join("absent.toml");
        let config = load_config(&absent, move || writer.clone()).unwrap();
        assert_eq!(config.language, "en");
        assert!(captured.text().contains("not found, using defaults"));

        let path = temp_dir.path().join("forge.toml");
        std::fs::write(&path, "language = \"de\"\n").unwrap();
        let writer = captured.clone();
        let config = load_config(&path, move || writer.clone()).unwrap();
        assert_eq!(config.language, "de");
        assert!(captured.text().contains("Loaded config"));
    }
}
