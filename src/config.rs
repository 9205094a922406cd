//! Framework Configuration
//!
//! Loaded from a TOML file. A missing file is not an error; defaults apply.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::host::NumericId;

pub const DEFAULT_CONFIG_FILE: &str = "content-forge.toml";

/// Identifier ranges handed out to registries.
///
/// Each content kind counts up from its own base so allocated ids never
/// collide with host ids or with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdRanges {
    pub item_base: NumericId,
    pub recipe_base: NumericId,
    pub quest_base: NumericId,
    /// First key used for item titles/descriptions in the host string table
    pub string_key_base: u32,
    /// Recipe index assigned to the first registered recipe
    pub recipe_index_base: i64,
}

impl Default for IdRanges {
    fn default() -> Self {
        Self {
            item_base: 60000,
            recipe_base: 51000,
            quest_base: 70000,
            string_key_base: 990000,
            recipe_index_base: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    pub packages_dir: PathBuf,
    /// Localization file name (without extension) read from each package
    pub language: String,
    /// Extra tracing directive, e.g. "content_forge=debug"
    pub log_filter: Option<String>,
    pub ids: IdRanges,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("packages"),
            language: "en".to_string(),
            log_filter: None,
            ids: IdRanges::default(),
        }
    }
}

impl FrameworkConfig {
    /// Load configuration from a TOML file, falling back to defaults if absent.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: FrameworkConfig = toml::from_str(&content).map_err(|e| LoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = FrameworkConfig::load(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.language, "en");
        assert_eq!(config.ids.item_base, 60000);
        assert_eq!(config.ids.recipe_base, 51000);
    }

    #[test]
    fn test_partial_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("forge.toml");
        std::fs::write(
            &path,
            r#"
packages_dir = "mods"

[ids]
item_base = 80000
"#,
        )
        .unwrap();

        let config = FrameworkConfig::load(&path).unwrap();
        assert_eq!(config.packages_dir, PathBuf::from("mods"));
        assert_eq!(config.ids.item_base, 80000);
        // untouched keys keep their defaults
        assert_eq!(config.ids.recipe_base, 51000);
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "ids = [").unwrap();
        assert!(matches!(
            FrameworkConfig::load(&path),
            Err(LoadError::Parse { .. })
        ));
    }
}
