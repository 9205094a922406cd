//! Item Registry
//!
//! Item-specific lookups on top of [`ContentRegistry`].

use crate::host::NumericId;
use crate::registry::{ContentRegistry, RegisteredEntry};

use super::definition::{EffectDefinition, ItemDefinition, ItemRef};

pub type ItemRegistry = ContentRegistry<ItemDefinition>;
pub type RegisteredItem = RegisteredEntry<ItemDefinition>;

/// Resolves item references found in recipes and quests.
pub trait ItemLookup {
    /// Resolve `item` as seen from a definition declared in `package_id`.
    fn resolve_item(&self, package_id: &str, item: &ItemRef) -> Option<NumericId>;
}

impl ItemLookup for ItemRegistry {
    /// Numeric references pass through. Names are tried as `package:name`,
    /// then as a fully-qualified key, then by unique `:name` suffix.
    fn resolve_item(&self, package_id: &str, item: &ItemRef) -> Option<NumericId> {
        let name = match item {
            ItemRef::Id(id) => return Some(*id),
            ItemRef::Name(name) => name,
        };

        if let Ok(id) = name.parse::<NumericId>() {
            return Some(id);
        }

        self.lookup_by_key(&format!("{}:{}", package_id, name))
            .or_else(|| self.lookup_by_key(name))
            .or_else(|| self.find_by_suffix(name))
            .map(|entry| entry.numeric_id)
    }
}

impl ItemRegistry {
    /// Numeric id for a fully-qualified key, e.g. `shrek_mod:shrek_hoodie`
    pub fn numeric_id_of(&self, key: &str) -> Option<NumericId> {
        self.lookup_by_key(key).map(|entry| entry.numeric_id)
    }

    /// Effects declared by the item registered under `id`.
    pub fn effects_of(&self, id: NumericId) -> Option<&[EffectDefinition]> {
        self.lookup_by_numeric_id(id)
            .map(|entry| entry.definition.effects.as_slice())
    }
}
