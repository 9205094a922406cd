use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

/// Prefix marking a display string as a localization key.
pub const LOCALIZATION_SENTINEL: char = '@';

/// Flat key -> text table loaded from `localization/<language>.json`.
#[derive(Debug, Clone, Default)]
pub struct Localization {
    entries: HashMap<String, String>,
}

impl Localization {
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Load a package's localization file. Missing or invalid files yield an empty table.
    pub fn load(package_dir: &Path, language: &str) -> Self {
        let path = package_dir
            .join("localization")
            .join(format!("{}.json", language));

        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<HashMap<String, String>>(&content).map_err(|e| e.to_string())
            });

        match parsed {
            Ok(entries) => Self { entries },
            Err(e) => {
                warn!("Failed to load localization {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Resolve `@key` to its translation (or the bare key if missing); other text is returned as-is.
    pub fn resolve(&self, text: &str) -> String {
        match text.strip_prefix(LOCALIZATION_SENTINEL) {
            Some(key) => self.get(key).unwrap_or(key).to_string(),
            None => text.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Localization {
        let mut entries = HashMap::new();
        entries.insert("potion.name".to_string(), "Example Potion".to_string());
        Localization::from_entries(entries)
    }

    #[test]
    fn test_resolve_indirection() {
        let loc = sample();
        assert_eq!(loc.resolve("@potion.name"), "Example Potion");
        assert_eq!(loc.resolve("@potion.desc"), "potion.desc");
        assert_eq!(loc.resolve("Plain Name"), "Plain Name");
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Localization::load(temp_dir.path(), "en").is_empty());

        let loc_dir = temp_dir.path().join("localization");
        std::fs::create_dir(&loc_dir).unwrap();
        std::fs::write(loc_dir.join("en.json"), "{ not json").unwrap();
        assert!(Localization::load(temp_dir.path(), "en").is_empty());

        std::fs::write(loc_dir.join("en.json"), r#"{ "a": "b" }"#).unwrap();
        assert_eq!(Localization::load(temp_dir.path(), "en").get("a"), Some("b"));
    }
}
