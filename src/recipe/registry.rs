//! Recipe Registry

use tracing::info;

use crate::host::{ContentTable, RecipeBook};
use crate::registry::{ContentRegistry, RegisteredEntry};

use super::definition::RecipeDefinition;

pub type RecipeRegistry = ContentRegistry<RecipeDefinition>;
pub type RegisteredRecipe = RegisteredEntry<RecipeDefinition>;

impl RecipeRegistry {
    /// Teach the player every injected auto-unlock recipe they do not know yet.
    ///
    /// Call on every session load; the host forgets unlocks it does not persist.
    pub fn unlock_pending<R, T>(&self, book: &mut dyn RecipeBook, table: &T) -> usize
    where
        T: ContentTable<R> + ?Sized,
    {
        let mut unlocked = 0;
        for entry in self.iter() {
            if !entry.definition.auto_unlock {
                continue;
            }
            let Some(id) = entry.materialized_in(table) else {
                continue;
            };
            if !book.has_recipe(id) {
                book.add_recipe(id);
                info!("Unlocked recipe {} ({})", entry.key, id);
                unlocked += 1;
            }
        }
        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{MemoryRecipe, MemoryRecipeBook, MemoryTable};
    use crate::item::ItemRef;
    use crate::package::PackageInfo;
    use std::rc::Rc;

    #[test]
    fn test_unlock_pending_only_materialized_auto_unlock() {
        let pkg = Rc::new(PackageInfo::inline("p"));
        let mut registry = RecipeRegistry::new(51000);
        let auto = registry
            .register(&pkg, RecipeDefinition::new("auto", ItemRef::Id(1)))
            .unwrap();
        let mut manual = RecipeDefinition::new("manual", ItemRef::Id(1));
        manual.auto_unlock = false;
        let manual = registry.register(&pkg, manual).unwrap();
        let missing = registry
            .register(&pkg, RecipeDefinition::new("missing", ItemRef::Id(1)))
            .unwrap();

        let mut table = MemoryTable::new("recipe");
        for id in [auto, manual] {
            table.set(id, MemoryRecipe::new(id, "item"));
        }
        for entry in registry.iter_mut() {
            let id = entry.numeric_id;
            entry.set_materialized(id);
        }

        let mut book = MemoryRecipeBook::default();
        assert_eq!(registry.unlock_pending(&mut book, &table), 1);
        assert!(book.has_recipe(auto));
        assert!(!book.has_recipe(manual));
        assert!(!book.has_recipe(missing));

        // Already known recipes are not added twice
        assert_eq!(registry.unlock_pending(&mut book, &table), 0);
    }
}
