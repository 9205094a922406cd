//! Recipe Injection
//!
//! Clones an item-type host recipe for each registered recipe and rewrites
//! it with the definition's result, ingredients, and bench.

use tracing::{error, info, warn};

use crate::config::IdRanges;
use crate::error::InjectError;
use crate::host::{fields, lists, ContentTable, FieldValue, HostTables, ListEntry, NumericId, RecipeRecord};
use crate::item::ItemLookup;
use crate::registry::InjectReport;

use super::registry::{RecipeRegistry, RegisteredRecipe};

const UNKNOWN_RECIPE_TITLE: &str = "Unknown Recipe";
const ITEM_RECIPE_KIND: &str = "item";

pub struct RecipeInjector {
    ids: IdRanges,
}

impl RecipeInjector {
    pub fn new(ids: IdRanges) -> Self {
        Self { ids }
    }

    /// Position of the recipe in the host's crafting list.
    pub fn recipe_index(&self, numeric_id: NumericId) -> i64 {
        self.ids.recipe_index_base + i64::from(numeric_id) - i64::from(self.ids.recipe_base)
    }

    pub fn inject_all<I, R: RecipeRecord>(
        &self,
        registry: &mut RecipeRegistry,
        items: &dyn ItemLookup,
        tables: &mut HostTables<'_, I, R>,
    ) -> Result<InjectReport, InjectError> {
        if !tables.recipes.is_ready() {
            warn!("Recipe table not ready, injection postponed");
            return Err(InjectError::TableNotReady(tables.recipes.name()));
        }

        info!("Injecting {} recipe(s)", registry.len());
        let mut report = InjectReport::default();

        for entry in registry.iter_mut() {
            match self.inject_entry(entry, items, &mut *tables.recipes) {
                Ok(true) => report.injected += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to inject recipe '{}': {}", entry.key, e);
                    report.failed += 1;
                }
            }
        }

        info!("Recipes: {}", report);
        Ok(report)
    }

    /// Returns false when the recipe is already in the table.
    fn inject_entry<R: RecipeRecord>(
        &self,
        entry: &mut RegisteredRecipe,
        items: &dyn ItemLookup,
        recipes: &mut dyn ContentTable<R>,
    ) -> Result<bool, InjectError> {
        let id = entry.numeric_id;
        if recipes.contains(id) {
            entry.set_materialized(id);
            return Ok(false);
        }

        let def = &entry.definition;
        let package_id = entry.package.id.as_str();

        let result = items
            .resolve_item(package_id, &def.result)
            .ok_or_else(|| InjectError::ResultUnresolved {
                entry: entry.key.clone(),
                result: def.result.to_string(),
            })?;

        let mut ingredients = Vec::with_capacity(def.ingredients.len());
        for ingredient in &def.ingredients {
            let item = items
                .resolve_item(package_id, &ingredient.item)
                .ok_or_else(|| InjectError::IngredientUnresolved {
                    entry: entry.key.clone(),
                    item: ingredient.item.to_string(),
                })?;
            ingredients.push(ListEntry::Ingredient {
                item,
                count: ingredient.count,
            });
        }

        let template = find_template(&*recipes, def.base_recipe, &entry.key)?;
        let mut record = recipes
            .get(template)
            .ok_or_else(|| InjectError::TemplateMissing(entry.key.clone()))?
            .clone_record();

        let title = if def.name.is_empty() {
            UNKNOWN_RECIPE_TITLE.to_string()
        } else {
            entry.resolve_text(&def.name)
        };

        record.set_field(fields::ID, FieldValue::Id(id))?;
        record.set_field(fields::RECIPE_KIND, FieldValue::Text(ITEM_RECIPE_KIND.to_string()))?;
        record.set_field(fields::INDEX, FieldValue::Int(self.recipe_index(id)))?;
        record.set_field(fields::REQUIRED_SKILL, FieldValue::Int(def.skill_required))?;
        record.set_field(fields::ACTIVE, FieldValue::Bool(true))?;
        record.set_field(fields::DIFFICULTY, FieldValue::Int(0))?;
        record.set_field(fields::TITLE, FieldValue::Text(title))?;
        record.set_field(fields::RESULT_ITEM, FieldValue::Id(result))?;
        record.set_field(fields::RESULT_COUNT, FieldValue::Int(i64::from(def.result_count)))?;
        record.set_field(
            fields::BENCH,
            FieldValue::Text(def.bench_type().as_str().to_string()),
        )?;

        // Template lists may be shared with the clone; swap before filling.
        record.replace_list(lists::REQUIRE_PRIMARY)?;
        for ingredient in ingredients {
            record.push_entry(lists::REQUIRE_PRIMARY, ingredient)?;
        }
        record.replace_list(lists::REQUIRE_SECONDARY)?;

        recipes.set(id, record);
        info!("Injected recipe {} ({})", entry.key, id);
        entry.set_materialized(id);
        Ok(true)
    }
}

/// The declared base recipe, or the lowest-id item recipe in the table.
fn find_template<R: RecipeRecord>(
    recipes: &dyn ContentTable<R>,
    declared: Option<NumericId>,
    key: &str,
) -> Result<NumericId, InjectError> {
    if let Some(base) = declared {
        return if recipes.contains(base) {
            Ok(base)
        } else {
            Err(InjectError::BaseMissing {
                entry: key.to_string(),
                base,
            })
        };
    }

    recipes
        .ids()
        .into_iter()
        .find(|id| recipes.get(*id).is_some_and(|r| r.is_item_recipe()))
        .ok_or_else(|| InjectError::TemplateMissing(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{templates, MemoryHost, MemoryRecipe};
    use crate::item::{ItemDefinition, ItemRef, ItemRegistry};
    use crate::package::PackageInfo;
    use crate::recipe::definition::{IngredientDefinition, RecipeDefinition};
    use std::rc::Rc;

    fn items() -> ItemRegistry {
        let mut items = ItemRegistry::new(60000);
        let pkg = Rc::new(PackageInfo::inline("demo"));
        items.register(&pkg, ItemDefinition::new("stew")).unwrap();
        items.register(&pkg, ItemDefinition::new("onion")).unwrap();
        items
    }

    fn stew_recipe() -> RecipeDefinition {
        let mut recipe = RecipeDefinition::new("stew_recipe", ItemRef::Name("stew".to_string()));
        recipe.bench = "kitchen".to_string();
        recipe.result_count = 2;
        recipe.ingredients = vec![
            IngredientDefinition {
                item: ItemRef::Name("onion".to_string()),
                count: 3,
            },
            IngredientDefinition {
                item: ItemRef::Id(templates::SCRAP),
                count: 1,
            },
        ];
        recipe
    }

    fn registry(defs: Vec<RecipeDefinition>) -> RecipeRegistry {
        let mut registry = RecipeRegistry::new(51000);
        let pkg = Rc::new(PackageInfo::inline("demo"));
        for def in defs {
            registry.register(&pkg, def).unwrap();
        }
        registry
    }

    #[test]
    fn test_recipe_index() {
        let injector = RecipeInjector::new(IdRanges::default());
        assert_eq!(injector.recipe_index(51000), 40);
        assert_eq!(injector.recipe_index(51005), 45);
    }

    #[test]
    fn test_inject_recipe_fields() {
        let items = items();
        let mut registry = registry(vec![stew_recipe()]);
        let mut host = MemoryHost::seeded();
        let injector = RecipeInjector::new(IdRanges::default());

        let report = injector
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(report.injected, 1);

        let recipe = host.recipes.get(51000).unwrap();
        assert_eq!(recipe.kind, "item");
        assert_eq!(recipe.index, 40);
        assert_eq!(recipe.difficulty, 0);
        assert_eq!(recipe.title, "Unknown Recipe");
        assert_eq!(recipe.result_item, 60000);
        assert_eq!(recipe.result_count, 2);
        assert_eq!(recipe.bench, "kitchen");
        assert_eq!(
            *recipe.require_primary.borrow(),
            vec![
                ListEntry::Ingredient { item: 60001, count: 3 },
                ListEntry::Ingredient { item: templates::SCRAP, count: 1 },
            ]
        );

        // Template ingredients untouched
        let template = host.recipes.get(templates::ITEM_RECIPE).unwrap();
        assert_eq!(template.require_primary.borrow().len(), 1);
    }

    #[test]
    fn test_inject_all_twice_skips_present_entries() {
        let items = items();
        let mut second = stew_recipe();
        second.id = "double_stew".to_string();
        let mut registry = registry(vec![stew_recipe(), second]);
        let mut host = MemoryHost::seeded();
        let injector = RecipeInjector::new(IdRanges::default());

        let first = injector
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(first.injected, 2);

        let writes = host.total_writes();
        let again = injector
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(again.skipped, 2);
        assert_eq!(again.injected, 0);
        assert_eq!(host.total_writes(), writes);

        host.recipes.remove(51000);
        let partial = injector
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(partial.injected, 1);
        assert_eq!(partial.skipped, 1);
        assert_eq!(host.recipes.get(51000).unwrap().result_item, 60000);
    }

    #[test]
    fn test_unresolved_references_fail_entry_only() {
        let items = items();
        let mut bad_result = RecipeDefinition::new("bad", ItemRef::Name("nothing".to_string()));
        bad_result.name = "Bad".to_string();
        let mut bad_ingredient = stew_recipe();
        bad_ingredient.id = "bad_ingredient".to_string();
        bad_ingredient.ingredients.push(IngredientDefinition {
            item: ItemRef::Name("unicorn".to_string()),
            count: 1,
        });
        let mut registry = registry(vec![bad_result, bad_ingredient, stew_recipe()]);
        let mut host = MemoryHost::seeded();

        let report = RecipeInjector::new(IdRanges::default())
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(report.failed, 2);
        assert_eq!(report.injected, 1);
        assert!(host.recipes.contains(51002));
    }

    #[test]
    fn test_template_selection() {
        let items = items();
        let mut host = MemoryHost::seeded();
        host.recipes.set(50, MemoryRecipe::new(50, "tool"));

        let mut declared = stew_recipe();
        declared.id = "declared_base".to_string();
        declared.base_recipe = Some(77);
        let mut registry = registry(vec![declared, stew_recipe()]);
        let report = RecipeInjector::new(IdRanges::default())
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();

        // Declared base missing fails; fallback skips the non-item recipe 50
        assert_eq!(report.failed, 1);
        assert_eq!(report.injected, 1);
    }

    #[test]
    fn test_no_template_available() {
        let items = items();
        let mut host = MemoryHost::seeded();
        host.recipes.clear();
        host.recipes.set(50, MemoryRecipe::new(50, "tool"));
        let mut registry = registry(vec![stew_recipe()]);

        let report = RecipeInjector::new(IdRanges::default())
            .inject_all(&mut registry, &items, &mut host.tables())
            .unwrap();
        assert_eq!(report.failed, 1);
    }
}
