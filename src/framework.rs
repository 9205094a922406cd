//! Framework Coordinator
//!
//! Owns the registries, injectors, and effect handler, and exposes the hooks
//! a host calls: discovery at startup, injection whenever its tables are
//! (re)built, action notifications, item use and display. None of these
//! return errors; failures are logged and reported as counts.

use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::config::IdRanges;
use crate::effect::{EffectHandler, EffectLine};
use crate::error::RegisterError;
use crate::host::{
    ActionNotification, ContentTable, HostTables, ItemRecord, NumericId, QuestRuntime, RecipeBook,
    RecipeRecord, StatStore,
};
use crate::item::{patches_outdated, ItemInjector, ItemRegistry};
use crate::markers::{CustomKind, CustomMarkers};
use crate::package::{LoadedPackage, PackageInfo, PackageSource};
use crate::quest::{evaluate_item_event, EvaluationReport, QuestGraph, QuestRegistry};
use crate::recipe::{RecipeInjector, RecipeRegistry};
use crate::registry::InjectReport;

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub packages: usize,
    pub registered: usize,
    /// Definitions that could not be registered (empty id)
    pub rejected: usize,
}

impl DiscoveryReport {
    fn merge(&mut self, other: DiscoveryReport) {
        self.packages += other.packages;
        self.registered += other.registered;
        self.rejected += other.rejected;
    }
}

/// What one host notification caused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionReport {
    /// Set when a session reload triggered re-injection
    pub reinjected: Option<InjectReport>,
    pub evaluation: EvaluationReport,
}

// ============================================================================
// Framework
// ============================================================================

pub struct Framework {
    packages: Vec<Rc<PackageInfo>>,
    items: ItemRegistry,
    recipes: RecipeRegistry,
    quests: QuestRegistry,
    item_injector: ItemInjector,
    recipe_injector: RecipeInjector,
    markers: CustomMarkers,
    effects: EffectHandler,
    /// True once a pass has run against a ready item table
    injected: bool,
}

impl Framework {
    pub fn new(ids: IdRanges) -> Self {
        Self {
            packages: Vec::new(),
            items: ItemRegistry::new(ids.item_base),
            recipes: RecipeRegistry::new(ids.recipe_base),
            quests: QuestRegistry::new(ids.quest_base),
            item_injector: ItemInjector::new(ids),
            recipe_injector: RecipeInjector::new(ids),
            markers: CustomMarkers::new(),
            effects: EffectHandler::new(),
            injected: false,
        }
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Load every package from `source` and register its definitions.
    pub fn discover(&mut self, source: &dyn PackageSource) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        for package in source.load_packages() {
            report.merge(self.register_package(package));
        }
        info!(
            "Discovered {} package(s): {} definition(s) registered, {} rejected",
            report.packages, report.registered, report.rejected
        );
        report
    }

    pub fn register_package(&mut self, package: LoadedPackage) -> DiscoveryReport {
        let info = package.info;
        if self.is_package_loaded(&info.id) {
            warn!("Package '{}' loaded twice; later definitions win", info.id);
        }
        info!(
            "Registering package {} v{} by {}",
            info.name, info.version, info.author
        );

        let mut report = DiscoveryReport {
            packages: 1,
            ..Default::default()
        };
        let mut tally = |result: Result<NumericId, RegisterError>| match result {
            Ok(_) => report.registered += 1,
            Err(e) => {
                error!("{}", e);
                report.rejected += 1;
            }
        };

        for item in package.items {
            tally(self.items.register(&info, item));
        }
        for recipe in package.recipes {
            tally(self.recipes.register(&info, recipe));
        }
        for quest in package.quests {
            tally(self.quests.register(&info, quest));
        }

        self.packages.push(info);
        report
    }

    /// Case-insensitive package id check.
    pub fn is_package_loaded(&self, package_id: &str) -> bool {
        self.packages
            .iter()
            .any(|p| p.id.eq_ignore_ascii_case(package_id))
    }

    pub fn packages(&self) -> &[Rc<PackageInfo>] {
        &self.packages
    }

    // ========================================================================
    // Injection
    // ========================================================================

    /// True when a host table no longer holds the first injected record, or
    /// a patched host record has lost its patch.
    pub fn needs_reinjection<I: ItemRecord, R>(&self, tables: &HostTables<'_, I, R>) -> bool {
        self.items.needs_reinjection::<I, _>(&*tables.items)
            || self.recipes.needs_reinjection::<R, _>(&*tables.recipes)
            || patches_outdated::<I, _>(&self.items, &*tables.items)
    }

    /// Inject items, then recipes, then compile quests.
    ///
    /// Skipped when a previous pass already materialized everything. An
    /// unready item table postpones the whole pass.
    pub fn inject_content<I: ItemRecord, R: RecipeRecord>(
        &mut self,
        tables: &mut HostTables<'_, I, R>,
    ) -> InjectReport {
        let mut report = InjectReport::default();
        if self.injected && !self.needs_reinjection(tables) {
            debug!("Content already present, skipping injection");
            return report;
        }

        match self
            .item_injector
            .inject_all(&mut self.items, tables, &mut self.markers)
        {
            Ok(items) => report.merge(items),
            Err(e) => {
                warn!("Injection postponed: {}", e);
                return report;
            }
        }
        self.injected = true;

        match self
            .recipe_injector
            .inject_all(&mut self.recipes, &self.items, tables)
        {
            Ok(recipes) => report.merge(recipes),
            Err(e) => warn!("Recipe injection postponed: {}", e),
        }

        self.quests.compile_all(&self.items);

        info!("Injection complete: {}", report);
        report
    }

    /// Handle one host action notification.
    ///
    /// A session reload probes the tables and re-injects if the host dropped
    /// our records; an item event runs the quest evaluator.
    pub fn on_action<I: ItemRecord, R: RecipeRecord>(
        &mut self,
        notification: &ActionNotification,
        tables: &mut HostTables<'_, I, R>,
        runtime: &mut dyn QuestRuntime,
    ) -> ActionReport {
        let mut report = ActionReport::default();

        if notification.is_session_reload() {
            if self.needs_reinjection(tables) {
                info!("Host tables were reset, re-injecting content");
                report.reinjected = Some(self.inject_content(tables));
            }
            return report;
        }

        if notification.is_item_event() {
            report.evaluation =
                evaluate_item_event(notification, &mut self.quests, &self.items, runtime);
        }
        report
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Apply the effects of a used item. False if the item is not ours.
    pub fn on_item_used(&self, item_id: NumericId, stats: &mut dyn StatStore) -> bool {
        self.effects.apply_item_effects(&self.items, item_id, stats)
    }

    /// Retry a deferred icon copy for an item the host is about to display.
    pub fn on_item_displayed<I, T>(&mut self, item_id: NumericId, items: &mut T) -> bool
    where
        I: ItemRecord,
        T: ContentTable<I> + ?Sized,
    {
        self.item_injector.retry_deferred(item_id, items)
    }

    pub fn resolve_deferred_assets<I, T>(&mut self, items: &mut T) -> usize
    where
        I: ItemRecord,
        T: ContentTable<I> + ?Sized,
    {
        self.item_injector.retry_all_deferred(items)
    }

    pub fn pending_asset_count(&self) -> usize {
        self.item_injector.pending_icon_count()
    }

    pub fn describe_item_effects(&self, item_id: NumericId) -> Option<Vec<EffectLine>> {
        self.effects.describe_effects(&self.items, item_id)
    }

    pub fn is_custom_bag(&self, item_id: NumericId) -> bool {
        self.markers.is_marked(CustomKind::Bag, item_id)
    }

    pub fn is_managed_item(&self, item_id: NumericId) -> bool {
        self.items.is_registered(item_id)
    }

    /// Numeric id of an item by its fully-qualified key.
    pub fn item_id(&self, key: &str) -> Option<NumericId> {
        self.items.numeric_id_of(key)
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn effects_mut(&mut self) -> &mut EffectHandler {
        &mut self.effects
    }

    // ========================================================================
    // Recipes
    // ========================================================================

    /// Teach the player every auto-unlock recipe still in the host table.
    pub fn unlock_recipes<R, T>(&self, book: &mut dyn RecipeBook, recipes: &T) -> usize
    where
        T: ContentTable<R> + ?Sized,
    {
        let unlocked = self.recipes.unlock_pending(book, recipes);
        if unlocked > 0 {
            info!("Unlocked {} recipe(s)", unlocked);
        }
        unlocked
    }

    pub fn recipes(&self) -> &RecipeRegistry {
        &self.recipes
    }

    // ========================================================================
    // Quests
    // ========================================================================

    pub fn quest_graph(&mut self, quest_id: &str) -> Option<&QuestGraph> {
        self.quests.graph_or_compile(quest_id, &self.items)
    }

    pub fn quest_title(&self, quest_id: &str) -> Option<String> {
        self.quests.quest_title(quest_id)
    }

    pub fn stage_text(&self, quest_id: &str, node_id: &str) -> Option<String> {
        self.quests.stage_text(quest_id, node_id)
    }

    pub fn stage_text_or_first(&self, quest_id: &str, node_id: Option<&str>) -> Option<String> {
        self.quests.stage_text_or_first(quest_id, node_id)
    }

    pub fn quest_translations(&self, quest_id: &str) -> Option<Vec<(String, String)>> {
        self.quests.translations(quest_id)
    }

    pub fn quests(&self) -> &QuestRegistry {
        &self.quests
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::new(IdRanges::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::{templates, MemoryHost};
    use crate::host::ActionKind;
    use crate::item::{EffectDefinition, ItemDefinition, ItemKind, ItemRef};
    use crate::recipe::RecipeDefinition;
    use crate::host::{StatKind, StatStore};

    fn package() -> LoadedPackage {
        let mut package = LoadedPackage::new(PackageInfo::inline("Demo"));
        let mut stew = ItemDefinition::new("stew");
        stew.effects = vec![EffectDefinition {
            stat: "food".to_string(),
            value: "+20".to_string(),
        }];
        let mut sack = ItemDefinition::new("sack");
        sack.kind = ItemKind::Bag;
        sack.base_item = 4;
        sack.bag_capacity = 30.0;
        package.items = vec![stew, sack];
        package.recipes = vec![RecipeDefinition::new("stew", ItemRef::Name("stew".to_string()))];
        package
    }

    fn framework() -> Framework {
        let mut framework = Framework::default();
        let report = framework.discover(&vec![package()]);
        assert_eq!(report.packages, 1);
        assert_eq!(report.registered, 3);
        framework
    }

    #[test]
    fn test_discover_and_package_lookup() {
        let mut framework = framework();
        assert!(framework.is_package_loaded("demo"));
        assert!(framework.is_package_loaded("DEMO"));
        assert!(!framework.is_package_loaded("other"));

        let mut broken = LoadedPackage::new(PackageInfo::inline("broken"));
        broken.items.push(ItemDefinition::new(""));
        let report = framework.register_package(broken);
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn test_inject_skips_when_present() {
        let mut framework = framework();
        let mut host = MemoryHost::seeded();

        let first = framework.inject_content(&mut host.tables());
        assert_eq!(first.injected, 3);
        assert!(!framework.needs_reinjection(&host.tables()));

        let writes = host.total_writes();
        let second = framework.inject_content(&mut host.tables());
        assert_eq!(second, InjectReport::default());
        assert_eq!(host.total_writes(), writes);
    }

    #[test]
    fn test_unready_table_postpones() {
        let mut framework = framework();
        let mut host = MemoryHost::empty();
        assert_eq!(framework.inject_content(&mut host.tables()), InjectReport::default());

        host.reload_tables();
        let report = framework.inject_content(&mut host.tables());
        assert_eq!(report.injected, 3);
    }

    #[test]
    fn test_session_reload_reinjects() {
        let mut framework = framework();
        let mut host = MemoryHost::seeded();
        framework.inject_content(&mut host.tables());

        let mut quests = host.quests.clone();
        let reload = ActionNotification::session_loaded();
        let report = framework.on_action(&reload, &mut host.tables(), &mut quests);
        assert!(report.reinjected.is_none());

        host.reload_tables();
        let report = framework.on_action(&reload, &mut host.tables(), &mut quests);
        assert_eq!(report.reinjected.unwrap().injected, 3);
        assert!(host.items.contains(60000));

        let talk = ActionNotification::new(ActionKind::Talk, 0, 0);
        assert_eq!(
            framework.on_action(&talk, &mut host.tables(), &mut quests),
            ActionReport::default()
        );
    }

    #[test]
    fn test_patch_only_package_survives_reload() {
        let mut package = LoadedPackage::new(PackageInfo::inline("cheap"));
        let mut patch = ItemDefinition::new("cheaper_food");
        patch.is_modify = true;
        patch.target_item_id = templates::CONSUMABLE;
        patch.price = 3;
        package.items.push(patch);

        let mut framework = Framework::default();
        framework.discover(&vec![package]);
        let mut host = MemoryHost::seeded();
        assert_eq!(framework.inject_content(&mut host.tables()).patched, 1);
        assert!(!framework.needs_reinjection(&host.tables()));

        host.reload_tables();
        assert_eq!(host.items.get(templates::CONSUMABLE).unwrap().price, 10);

        let mut quests = host.quests.clone();
        let reload = ActionNotification::session_loaded();
        let report = framework.on_action(&reload, &mut host.tables(), &mut quests);
        assert_eq!(report.reinjected.unwrap().patched, 1);
        assert_eq!(host.items.get(templates::CONSUMABLE).unwrap().price, 3);

        let report = framework.on_action(&reload, &mut host.tables(), &mut quests);
        assert!(report.reinjected.is_none());
    }

    #[test]
    fn test_item_hooks() {
        let mut framework = framework();
        let mut host = MemoryHost::seeded();
        framework.inject_content(&mut host.tables());

        let stew = framework.item_id("Demo:stew").unwrap();
        let sack = framework.item_id("Demo:sack").unwrap();
        assert!(framework.is_managed_item(stew));
        assert!(!framework.is_managed_item(1));
        assert!(framework.is_custom_bag(sack));
        assert!(!framework.is_custom_bag(stew));

        assert!(framework.on_item_used(stew, &mut host.stats));
        assert_eq!(host.stats.stat(StatKind::Food).unwrap().current, 70.0);
        assert!(!framework.on_item_used(1, &mut host.stats));

        let lines = framework.describe_item_effects(stew).unwrap();
        assert_eq!(lines[0].value, "+20");
    }

    #[test]
    fn test_unlock_recipes() {
        let mut framework = framework();
        let mut host = MemoryHost::seeded();
        framework.inject_content(&mut host.tables());

        assert_eq!(framework.unlock_recipes(&mut host.recipe_book, &host.recipes), 1);
        assert_eq!(framework.unlock_recipes(&mut host.recipe_book, &host.recipes), 0);
    }
}
