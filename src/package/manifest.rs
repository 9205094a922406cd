//! Package Manifest
//!
//! Describes one package folder (`mod.json` or `mod.toml`).

use std::path::PathBuf;

use serde::Deserialize;

use super::localization::Localization;

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

/// Raw manifest as it appears in the package folder
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawManifest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub game_version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A loaded package: manifest data, folder, and cached localization.
#[derive(Debug, Clone)]
pub struct PackageInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub author: String,
    pub description: String,
    pub game_version: String,
    pub dependencies: Vec<String>,
    pub dir: PathBuf,
    pub localization: Localization,
}

impl PackageInfo {
    pub fn from_raw(raw: RawManifest, dir: PathBuf, localization: Localization) -> Self {
        Self {
            name: if raw.name.is_empty() {
                raw.id.clone()
            } else {
                raw.name
            },
            id: raw.id,
            version: raw.version,
            author: raw.author,
            description: raw.description,
            game_version: raw.game_version,
            dependencies: raw.dependencies,
            dir,
            localization,
        }
    }

    /// Package with no folder and no localization, for content built in code.
    pub fn inline(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            version: default_version(),
            author: default_author(),
            description: String::new(),
            game_version: String::new(),
            dependencies: Vec::new(),
            dir: PathBuf::new(),
            localization: Localization::default(),
        }
    }

    /// Fully-qualified key of a definition declared by this package.
    pub fn qualify(&self, definition_id: &str) -> String {
        format!("{}:{}", self.id, definition_id)
    }

    /// Resolve a display string: `@key` goes through localization, anything else is literal.
    pub fn resolve_text(&self, text: &str) -> String {
        self.localization.resolve(text)
    }
}
