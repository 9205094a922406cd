//! Filesystem Package Source
//!
//! ```text
//! packages/
//!   shrek_mod/
//!     mod.json            (or mod.toml)
//!     items/*.json|toml
//!     recipes/*.json|toml
//!     quests/*.json|toml
//!     localization/en.json
//! ```
//!
//! A document that fails to parse is logged and skipped; the rest of the
//! package still loads.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::error::LoadError;

use super::localization::Localization;
use super::manifest::{PackageInfo, RawManifest};
use super::{LoadedPackage, PackageSource};

const MANIFEST_NAMES: [&str; 2] = ["mod.json", "mod.toml"];

// ============================================================================
// Format detection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

pub fn detect_format(path: &Path) -> Result<Format, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    let parsed = match format {
        Format::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|detail| LoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

/// Supported documents directly inside `dir`, sorted by file name.
fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && detect_format(&path).is_ok() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

// ============================================================================
// Directory source
// ============================================================================

/// Loads every package folder under a root directory.
pub struct DirectoryPackageSource {
    root: PathBuf,
    language: String,
}

impl DirectoryPackageSource {
    pub fn new(root: impl Into<PathBuf>, language: &str) -> Self {
        Self {
            root: root.into(),
            language: language.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load one package folder.
    pub fn load_package(&self, dir: &Path) -> Result<LoadedPackage, LoadError> {
        let manifest_path = MANIFEST_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| LoadError::MissingManifest(dir.to_path_buf()))?;

        let raw: RawManifest = read_document(&manifest_path)?;
        let localization = Localization::load(dir, &self.language);
        let info = PackageInfo::from_raw(raw, dir.to_path_buf(), localization);

        info!(
            "Loading package {} v{} by {} from {:?}",
            info.name, info.version, info.author, dir
        );

        let mut package = LoadedPackage::new(info);
        package.items = load_definitions(&dir.join("items"));
        package.recipes = load_definitions(&dir.join("recipes"));
        package.quests = load_definitions(&dir.join("quests"));

        info!(
            "  {} item(s), {} recipe(s), {} quest(s)",
            package.items.len(),
            package.recipes.len(),
            package.quests.len()
        );
        Ok(package)
    }
}

impl PackageSource for DirectoryPackageSource {
    fn load_packages(&self) -> Vec<LoadedPackage> {
        if !self.root.is_dir() {
            warn!("Packages directory does not exist: {:?}", self.root);
            return Vec::new();
        }

        let mut dirs: Vec<PathBuf> = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(e) => {
                error!("Failed to read packages directory {:?}: {}", self.root, e);
                return Vec::new();
            }
        };
        dirs.sort();

        let mut packages = Vec::new();
        for dir in dirs {
            match self.load_package(&dir) {
                Ok(package) => packages.push(package),
                Err(LoadError::MissingManifest(path)) => {
                    warn!("Skipping {:?}: no mod.json or mod.toml", path);
                }
                Err(e) => error!("Failed to load package {:?}: {}", dir, e),
            }
        }

        info!("Found {} package(s) in {:?}", packages.len(), self.root);
        packages
    }
}

fn load_definitions<T: DeserializeOwned>(dir: &Path) -> Vec<T> {
    let paths = match list_documents(dir) {
        Ok(paths) => paths,
        Err(e) => {
            error!("Failed to list {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut definitions = Vec::new();
    for path in paths {
        match read_document(&path) {
            Ok(definition) => definitions.push(definition),
            Err(e) => error!("{}", e),
        }
    }
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert!(matches!(
            detect_format(Path::new("a.yaml")),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_package_mixed_formats() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("shrek");
        write(&pkg.join("mod.json"), r#"{ "id": "shrek_mod", "name": "Shrek" }"#);
        write(&pkg.join("items/b_hoodie.json"), r#"{ "id": "hoodie", "type": "gear" }"#);
        write(
            &pkg.join("items/a_onion.toml"),
            "id = \"onion\"\nprice = 5\n",
        );
        write(&pkg.join("items/readme.txt"), "not content");
        write(
            &pkg.join("recipes/stew.json"),
            r#"{ "id": "stew", "result": "onion" }"#,
        );
        write(
            &pkg.join("localization/en.json"),
            r#"{ "onion.name": "Onion" }"#,
        );

        let source = DirectoryPackageSource::new(temp_dir.path(), "en");
        let loaded = source.load_package(&pkg).unwrap();

        assert_eq!(loaded.info.id, "shrek_mod");
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].id, "onion");
        assert_eq!(loaded.items[0].price, 5);
        assert_eq!(loaded.items[1].id, "hoodie");
        assert_eq!(loaded.recipes.len(), 1);
        assert!(loaded.quests.is_empty());
        assert_eq!(loaded.info.resolve_text("@onion.name"), "Onion");
    }

    #[test]
    fn test_bad_document_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("p");
        write(&pkg.join("mod.toml"), "id = \"p\"\n");
        write(&pkg.join("items/broken.json"), "{ \"id\": ");
        write(&pkg.join("items/ok.json"), r#"{ "id": "ok" }"#);

        let source = DirectoryPackageSource::new(temp_dir.path(), "en");
        let loaded = source.load_package(&pkg).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].id, "ok");
    }

    #[test]
    fn test_load_packages_sorted_and_skips_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("b/mod.json"), r#"{ "id": "b" }"#);
        write(&temp_dir.path().join("a/mod.json"), r#"{ "id": "a" }"#);
        fs::create_dir_all(temp_dir.path().join("c/items")).unwrap();

        let source = DirectoryPackageSource::new(temp_dir.path(), "en");
        let packages = source.load_packages();
        let ids: Vec<_> = packages.iter().map(|p| p.info.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let source = DirectoryPackageSource::new(temp_dir.path().join("nope"), "en");
        assert!(source.load_packages().is_empty());
    }
}
