//! In-Memory Host
//!
//! A self-contained host simulation used by the dry-run binary and the
//! tests. Records mimic the host's clone behaviour: cloning a record shares
//! its nested lists with the original.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use crate::error::HostError;

use super::{
    fields, lists, ContentTable, FieldValue, HostRecord, HostTables, ItemRecord, ItemVariant,
    ListEntry, NumericId, QuestRuntime, RecipeBook, RecipeRecord, StatKind, StatStore, StatValue,
    StringTable,
};

/// Nested list handle. Cloning the handle aliases the list.
pub type SharedList = Rc<RefCell<Vec<ListEntry>>>;

fn new_list(entries: Vec<ListEntry>) -> SharedList {
    Rc::new(RefCell::new(entries))
}

// ============================================================================
// Item Records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryItem {
    pub id: NumericId,
    pub variant: ItemVariant,
    pub title_key: u32,
    pub description_key: u32,
    pub price: i64,
    pub weight: f64,
    pub rare_color: i64,
    pub sellable: bool,
    pub not_for_fire: bool,
    pub sound_type: i64,
    pub fire_rate: i64,
    pub stockable: bool,
    pub stock_count: i64,
    pub icon: Option<String>,
    pub category: String,
    pub warm_resistance: i64,
    pub wet_resistance: i64,
    pub durability_resistance: i64,
    pub attack: i64,
    pub defense: i64,
    pub critical_chance: i64,
    pub max_durability: i64,
    pub actual_durability: i64,
    pub capacity: f64,
    pub changes: SharedList,
    pub buff_changes: SharedList,
    pub parameter_changes: SharedList,
}

impl MemoryItem {
    pub fn new(id: NumericId, variant: ItemVariant) -> Self {
        Self {
            id,
            variant,
            title_key: id,
            description_key: id,
            price: 10,
            weight: 0.5,
            rare_color: 0,
            sellable: true,
            not_for_fire: false,
            sound_type: 0,
            fire_rate: 0,
            stockable: true,
            stock_count: 1,
            icon: None,
            category: String::new(),
            warm_resistance: 0,
            wet_resistance: 0,
            durability_resistance: 100,
            attack: 0,
            defense: 0,
            critical_chance: 0,
            max_durability: 100,
            actual_durability: 100,
            capacity: 0.0,
            changes: new_list(Vec::new()),
            buff_changes: new_list(Vec::new()),
            parameter_changes: new_list(Vec::new()),
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    fn list(&self, name: &str) -> Result<&SharedList, HostError> {
        match name {
            lists::CHANGES => Ok(&self.changes),
            lists::BUFF_CHANGES => Ok(&self.buff_changes),
            lists::PARAMETER_CHANGES => Ok(&self.parameter_changes),
            _ => Err(HostError::UnknownList(name.to_string())),
        }
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut SharedList, HostError> {
        match name {
            lists::CHANGES => Ok(&mut self.changes),
            lists::BUFF_CHANGES => Ok(&mut self.buff_changes),
            lists::PARAMETER_CHANGES => Ok(&mut self.parameter_changes),
            _ => Err(HostError::UnknownList(name.to_string())),
        }
    }
}

impl HostRecord for MemoryItem {
    fn clone_record(&self) -> Self {
        self.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            fields::ID => FieldValue::Id(self.id),
            fields::TITLE_KEY => FieldValue::Int(self.title_key as i64),
            fields::DESCRIPTION_KEY => FieldValue::Int(self.description_key as i64),
            fields::PRICE => FieldValue::Int(self.price),
            fields::WEIGHT => FieldValue::Float(self.weight),
            fields::RARE_COLOR => FieldValue::Int(self.rare_color),
            fields::SELLABLE => FieldValue::Bool(self.sellable),
            fields::NOT_FOR_FIRE => FieldValue::Bool(self.not_for_fire),
            fields::SOUND_TYPE => FieldValue::Int(self.sound_type),
            fields::FIRE_RATE => FieldValue::Int(self.fire_rate),
            fields::STOCKABLE => FieldValue::Bool(self.stockable),
            fields::STOCK_COUNT => FieldValue::Int(self.stock_count),
            fields::ICON => FieldValue::Asset(self.icon.clone()?),
            fields::CATEGORY => FieldValue::Text(self.category.clone()),
            fields::WARM_RESISTANCE => FieldValue::Int(self.warm_resistance),
            fields::WET_RESISTANCE => FieldValue::Int(self.wet_resistance),
            fields::DURABILITY_RESISTANCE => FieldValue::Int(self.durability_resistance),
            fields::ATTACK => FieldValue::Int(self.attack),
            fields::DEFENSE => FieldValue::Int(self.defense),
            fields::CRITICAL_CHANCE => FieldValue::Int(self.critical_chance),
            fields::MAX_DURABILITY => FieldValue::Int(self.max_durability),
            fields::ACTUAL_DURABILITY => FieldValue::Int(self.actual_durability),
            fields::CAPACITY => FieldValue::Float(self.capacity),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), HostError> {
        match name {
            fields::ID => self.id = value.into_id(name)?,
            fields::TITLE_KEY => self.title_key = value.into_int(name)? as u32,
            fields::DESCRIPTION_KEY => self.description_key = value.into_int(name)? as u32,
            fields::PRICE => self.price = value.into_int(name)?,
            fields::WEIGHT => self.weight = value.into_float(name)?,
            fields::RARE_COLOR => self.rare_color = value.into_int(name)?,
            fields::SELLABLE => self.sellable = value.into_bool(name)?,
            fields::NOT_FOR_FIRE => self.not_for_fire = value.into_bool(name)?,
            fields::SOUND_TYPE => self.sound_type = value.into_int(name)?,
            fields::FIRE_RATE => self.fire_rate = value.into_int(name)?,
            fields::STOCKABLE => self.stockable = value.into_bool(name)?,
            fields::STOCK_COUNT => self.stock_count = value.into_int(name)?,
            fields::ICON => self.icon = Some(value.into_asset(name)?),
            fields::CATEGORY => self.category = value.into_text(name)?,
            fields::WARM_RESISTANCE => self.warm_resistance = value.into_int(name)?,
            fields::WET_RESISTANCE => self.wet_resistance = value.into_int(name)?,
            fields::DURABILITY_RESISTANCE => self.durability_resistance = value.into_int(name)?,
            fields::ATTACK => self.attack = value.into_int(name)?,
            fields::DEFENSE => self.defense = value.into_int(name)?,
            fields::CRITICAL_CHANCE => self.critical_chance = value.into_int(name)?,
            fields::MAX_DURABILITY => self.max_durability = value.into_int(name)?,
            fields::ACTUAL_DURABILITY => self.actual_durability = value.into_int(name)?,
            fields::CAPACITY => self.capacity = value.into_float(name)?,
            _ => return Err(HostError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn replace_list(&mut self, name: &str) -> Result<(), HostError> {
        *self.list_mut(name)? = new_list(Vec::new());
        Ok(())
    }

    fn push_entry(&mut self, list: &str, entry: ListEntry) -> Result<(), HostError> {
        self.list(list)?.borrow_mut().push(entry);
        Ok(())
    }
}

impl ItemRecord for MemoryItem {
    fn variant(&self) -> ItemVariant {
        self.variant
    }
}

// ============================================================================
// Recipe Records
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecipe {
    pub id: NumericId,
    pub kind: String,
    pub index: i64,
    pub required_skill: i64,
    pub active: bool,
    pub difficulty: i64,
    pub title: String,
    pub result_item: NumericId,
    pub result_count: i64,
    pub bench: String,
    pub require_primary: SharedList,
    pub require_secondary: SharedList,
}

impl MemoryRecipe {
    pub fn new(id: NumericId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            index: 0,
            required_skill: 0,
            active: true,
            difficulty: 1,
            title: String::new(),
            result_item: 0,
            result_count: 1,
            bench: "nothing".to_string(),
            require_primary: new_list(Vec::new()),
            require_secondary: new_list(Vec::new()),
        }
    }

    fn list(&self, name: &str) -> Result<&SharedList, HostError> {
        match name {
            lists::REQUIRE_PRIMARY => Ok(&self.require_primary),
            lists::REQUIRE_SECONDARY => Ok(&self.require_secondary),
            _ => Err(HostError::UnknownList(name.to_string())),
        }
    }

    fn list_mut(&mut self, name: &str) -> Result<&mut SharedList, HostError> {
        match name {
            lists::REQUIRE_PRIMARY => Ok(&mut self.require_primary),
            lists::REQUIRE_SECONDARY => Ok(&mut self.require_secondary),
            _ => Err(HostError::UnknownList(name.to_string())),
        }
    }
}

impl HostRecord for MemoryRecipe {
    fn clone_record(&self) -> Self {
        self.clone()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            fields::ID => FieldValue::Id(self.id),
            fields::RECIPE_KIND => FieldValue::Text(self.kind.clone()),
            fields::INDEX => FieldValue::Int(self.index),
            fields::REQUIRED_SKILL => FieldValue::Int(self.required_skill),
            fields::ACTIVE => FieldValue::Bool(self.active),
            fields::DIFFICULTY => FieldValue::Int(self.difficulty),
            fields::TITLE => FieldValue::Text(self.title.clone()),
            fields::RESULT_ITEM => FieldValue::Id(self.result_item),
            fields::RESULT_COUNT => FieldValue::Int(self.result_count),
            fields::BENCH => FieldValue::Text(self.bench.clone()),
            _ => return None,
        };
        Some(value)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), HostError> {
        match name {
            fields::ID => self.id = value.into_id(name)?,
            fields::RECIPE_KIND => self.kind = value.into_text(name)?,
            fields::INDEX => self.index = value.into_int(name)?,
            fields::REQUIRED_SKILL => self.required_skill = value.into_int(name)?,
            fields::ACTIVE => self.active = value.into_bool(name)?,
            fields::DIFFICULTY => self.difficulty = value.into_int(name)?,
            fields::TITLE => self.title = value.into_text(name)?,
            fields::RESULT_ITEM => self.result_item = value.into_id(name)?,
            fields::RESULT_COUNT => self.result_count = value.into_int(name)?,
            fields::BENCH => self.bench = value.into_text(name)?,
            _ => return Err(HostError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn replace_list(&mut self, name: &str) -> Result<(), HostError> {
        *self.list_mut(name)? = new_list(Vec::new());
        Ok(())
    }

    fn push_entry(&mut self, list: &str, entry: ListEntry) -> Result<(), HostError> {
        self.list(list)?.borrow_mut().push(entry);
        Ok(())
    }
}

impl RecipeRecord for MemoryRecipe {
    fn is_item_recipe(&self) -> bool {
        self.kind == "item"
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Ordered table that counts every write it receives.
#[derive(Debug, Clone)]
pub struct MemoryTable<R> {
    name: &'static str,
    records: BTreeMap<NumericId, R>,
    writes: usize,
}

impl<R> MemoryTable<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            records: BTreeMap::new(),
            writes: 0,
        }
    }

    /// Number of `set` and `get_mut` calls received so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop one record, as a host does when it rebuilds part of a table.
    pub fn remove(&mut self, id: NumericId) -> Option<R> {
        self.records.remove(&id)
    }
}

impl<R> ContentTable<R> for MemoryTable<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_ready(&self) -> bool {
        !self.records.is_empty()
    }

    fn contains(&self, id: NumericId) -> bool {
        self.records.contains_key(&id)
    }

    fn get(&self, id: NumericId) -> Option<&R> {
        self.records.get(&id)
    }

    fn get_mut(&mut self, id: NumericId) -> Option<&mut R> {
        self.writes += 1;
        self.records.get_mut(&id)
    }

    fn set(&mut self, id: NumericId, record: R) {
        self.writes += 1;
        self.records.insert(id, record);
    }

    fn ids(&self) -> Vec<NumericId> {
        self.records.keys().copied().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStrings {
    entries: HashMap<u32, String>,
    writes: usize,
}

impl MemoryStrings {
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StringTable for MemoryStrings {
    fn set_string(&mut self, key: u32, text: String) {
        self.writes += 1;
        self.entries.insert(key, text);
    }

    fn get_string(&self, key: u32) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }
}

// ============================================================================
// Character State
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    values: HashMap<StatKind, StatValue>,
}

impl MemoryStats {
    pub fn insert(&mut self, stat: StatKind, current: f64, max: f64) {
        self.values.insert(stat, StatValue { current, max });
    }

    pub fn current(&self, stat: StatKind) -> Option<f64> {
        self.values.get(&stat).map(|v| v.current)
    }
}

impl StatStore for MemoryStats {
    fn stat(&self, stat: StatKind) -> Option<StatValue> {
        self.values.get(&stat).copied()
    }

    fn set_stat(&mut self, stat: StatKind, value: f64) {
        if let Some(entry) = self.values.get_mut(&stat) {
            entry.current = value;
        }
    }
}

/// Quest instances, inventory, and completed-node log.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuestRuntime {
    /// Quest ids reported as in progress, in start order
    active: Vec<String>,
    /// In-progress node ids per known quest instance
    nodes: HashMap<String, Vec<String>>,
    inventory: HashMap<NumericId, i32>,
    completed_nodes: Vec<(String, String)>,
}

impl MemoryQuestRuntime {
    pub fn start_quest(&mut self, quest_id: &str, entry_node: &str) {
        self.active.push(quest_id.to_string());
        self.nodes
            .insert(quest_id.to_string(), vec![entry_node.to_string()]);
    }

    /// Report an instance as in progress without tracking its nodes
    pub fn track_unknown(&mut self, quest_id: &str) {
        self.active.push(quest_id.to_string());
    }

    pub fn activate_node(&mut self, quest_id: &str, node_id: &str) {
        if let Some(nodes) = self.nodes.get_mut(quest_id) {
            nodes.push(node_id.to_string());
        }
    }

    pub fn set_inventory(&mut self, item: NumericId, count: i32) {
        self.inventory.insert(item, count);
    }

    pub fn completed_nodes(&self) -> &[(String, String)] {
        &self.completed_nodes
    }
}

impl QuestRuntime for MemoryQuestRuntime {
    fn in_progress_quests(&self) -> Vec<String> {
        self.active.clone()
    }

    fn in_progress_nodes(&self, quest_id: &str) -> Result<Vec<String>, HostError> {
        self.nodes
            .get(quest_id)
            .cloned()
            .ok_or_else(|| HostError::UnknownQuest(quest_id.to_string()))
    }

    fn inventory_count(&self, item: NumericId) -> i32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    fn mark_node_done(&mut self, quest_id: &str, node_id: &str) -> Result<(), HostError> {
        let nodes = self
            .nodes
            .get_mut(quest_id)
            .ok_or_else(|| HostError::UnknownQuest(quest_id.to_string()))?;
        let position = nodes
            .iter()
            .position(|n| n == node_id)
            .ok_or_else(|| HostError::UnknownNode {
                quest: quest_id.to_string(),
                node: node_id.to_string(),
            })?;
        nodes.remove(position);
        self.completed_nodes
            .push((quest_id.to_string(), node_id.to_string()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRecipeBook {
    known: BTreeSet<NumericId>,
}

impl MemoryRecipeBook {
    pub fn known(&self) -> impl Iterator<Item = &NumericId> {
        self.known.iter()
    }
}

impl RecipeBook for MemoryRecipeBook {
    fn has_recipe(&self, id: NumericId) -> bool {
        self.known.contains(&id)
    }

    fn add_recipe(&mut self, id: NumericId) {
        self.known.insert(id);
    }
}

// ============================================================================
// Host
// ============================================================================

/// Template ids seeded by [`MemoryHost::seeded`].
pub mod templates {
    use crate::host::NumericId;

    pub const CONSUMABLE: NumericId = 1;
    pub const GEAR: NumericId = 2;
    pub const WEAPON: NumericId = 3;
    pub const BAG: NumericId = 4;
    pub const SCRAP: NumericId = 5;
    pub const ITEM_RECIPE: NumericId = 100;
}

pub struct MemoryHost {
    pub items: MemoryTable<MemoryItem>,
    pub recipes: MemoryTable<MemoryRecipe>,
    pub strings: MemoryStrings,
    pub stats: MemoryStats,
    pub quests: MemoryQuestRuntime,
    pub recipe_book: MemoryRecipeBook,
}

impl MemoryHost {
    /// A host whose tables have not been populated yet.
    pub fn empty() -> Self {
        Self {
            items: MemoryTable::new("item"),
            recipes: MemoryTable::new("recipe"),
            strings: MemoryStrings::default(),
            stats: MemoryStats::default(),
            quests: MemoryQuestRuntime::default(),
            recipe_book: MemoryRecipeBook::default(),
        }
    }

    /// A host with one template record per item variant and one item recipe.
    pub fn seeded() -> Self {
        let mut host = Self::empty();
        host.populate_tables();

        for stat in [
            StatKind::Health,
            StatKind::Food,
            StatKind::Morale,
            StatKind::Grit,
            StatKind::Stamina,
            StatKind::Warm,
            StatKind::Illness,
            StatKind::Toxicity,
            StatKind::Wet,
            StatKind::Freshness,
        ] {
            host.stats.insert(stat, 50.0, 100.0);
        }
        host
    }

    /// Drop and rebuild the content tables, as the host does on a new session.
    pub fn reload_tables(&mut self) {
        self.items.clear();
        self.recipes.clear();
        self.populate_tables();
    }

    fn populate_tables(&mut self) {
        let consumable = MemoryItem::new(templates::CONSUMABLE, ItemVariant::Consumable)
            .with_icon("vanilla/consumable.png");
        consumable.changes.borrow_mut().push(ListEntry::Parameter {
            stat: "food".to_string(),
            value: 10,
        });
        self.items.set(templates::CONSUMABLE, consumable);

        let gear = MemoryItem::new(templates::GEAR, ItemVariant::Gear).with_icon("vanilla/gear.png");
        gear.parameter_changes.borrow_mut().push(ListEntry::Parameter {
            stat: "warm".to_string(),
            value: 5,
        });
        self.items.set(templates::GEAR, gear);

        self.items.set(
            templates::WEAPON,
            MemoryItem::new(templates::WEAPON, ItemVariant::Weapon).with_icon("vanilla/weapon.png"),
        );
        let mut bag = MemoryItem::new(templates::BAG, ItemVariant::Bag);
        bag.capacity = 10.0;
        self.items.set(templates::BAG, bag);
        self.items.set(
            templates::SCRAP,
            MemoryItem::new(templates::SCRAP, ItemVariant::Scrap),
        );

        let recipe = MemoryRecipe::new(templates::ITEM_RECIPE, "item");
        recipe.require_primary.borrow_mut().push(ListEntry::Ingredient {
            item: templates::SCRAP,
            count: 2,
        });
        self.recipes.set(templates::ITEM_RECIPE, recipe);
    }

    pub fn tables(&mut self) -> HostTables<'_, MemoryItem, MemoryRecipe> {
        HostTables {
            items: &mut self.items,
            recipes: &mut self.recipes,
            strings: &mut self.strings,
        }
    }

    /// Table view plus the quest runtime, for hooks that need both.
    pub fn tables_and_quests(
        &mut self,
    ) -> (HostTables<'_, MemoryItem, MemoryRecipe>, &mut MemoryQuestRuntime) {
        let tables = HostTables {
            items: &mut self.items,
            recipes: &mut self.recipes,
            strings: &mut self.strings,
        };
        (tables, &mut self.quests)
    }

    /// Total writes across every content and string table.
    pub fn total_writes(&self) -> usize {
        self.items.writes() + self.recipes.writes() + self.strings.writes()
    }
}
