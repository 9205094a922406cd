//! Packages
//!
//! A package is a folder of declarative content: a manifest, item, recipe,
//! and quest documents, and an optional localization table.

pub mod loader;
pub mod localization;
pub mod manifest;

use std::rc::Rc;

use crate::item::ItemDefinition;
use crate::quest::QuestDefinition;
use crate::recipe::RecipeDefinition;

pub use loader::{detect_format, read_document, DirectoryPackageSource, Format};
pub use localization::{Localization, LOCALIZATION_SENTINEL};
pub use manifest::{PackageInfo, RawManifest};

/// Definitions parsed from one package, in file-name order.
#[derive(Debug, Clone)]
pub struct LoadedPackage {
    pub info: Rc<PackageInfo>,
    pub items: Vec<ItemDefinition>,
    pub recipes: Vec<RecipeDefinition>,
    pub quests: Vec<QuestDefinition>,
}

impl LoadedPackage {
    pub fn new(info: PackageInfo) -> Self {
        Self {
            info: Rc::new(info),
            items: Vec::new(),
            recipes: Vec::new(),
            quests: Vec::new(),
        }
    }

    pub fn definition_count(&self) -> usize {
        self.items.len() + self.recipes.len() + self.quests.len()
    }
}

/// Supplies packages to the framework.
///
/// Implementations should yield packages in a deterministic order; numeric
/// ids are assigned in that order.
pub trait PackageSource {
    fn load_packages(&self) -> Vec<LoadedPackage>;
}

/// Packages built in code.
impl PackageSource for Vec<LoadedPackage> {
    fn load_packages(&self) -> Vec<LoadedPackage> {
        self.clone()
    }
}
