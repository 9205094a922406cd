//! Host Boundary
//!
//! The host simulation owns the live content tables, string table, stat
//! store, and quest runtime. The core only talks to it through these traits,
//! writing record fields by name through [`HostRecord::set_field`].

pub mod memory;

use crate::error::HostError;

pub use memory::MemoryHost;

/// Numeric identifier of a record in a host table.
pub type NumericId = u32;

// ============================================================================
// Field Values
// ============================================================================

/// Value written into (or read from) a named field of a host record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Id(NumericId),
    /// Opaque visual asset reference (sprite handle or icon path)
    Asset(String),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::Text(_) => "text",
            FieldValue::Id(_) => "id",
            FieldValue::Asset(_) => "asset",
        }
    }

    fn mismatch(&self, field: &str) -> HostError {
        HostError::FieldType {
            field: field.to_string(),
            given: self.type_name(),
        }
    }

    pub fn into_int(self, field: &str) -> Result<i64, HostError> {
        match self {
            FieldValue::Int(v) => Ok(v),
            FieldValue::Id(v) => Ok(v as i64),
            other => Err(other.mismatch(field)),
        }
    }

    pub fn into_float(self, field: &str) -> Result<f64, HostError> {
        match self {
            FieldValue::Float(v) => Ok(v),
            FieldValue::Int(v) => Ok(v as f64),
            other => Err(other.mismatch(field)),
        }
    }

    pub fn into_bool(self, field: &str) -> Result<bool, HostError> {
        match self {
            FieldValue::Bool(v) => Ok(v),
            other => Err(other.mismatch(field)),
        }
    }

    pub fn into_text(self, field: &str) -> Result<String, HostError> {
        match self {
            FieldValue::Text(v) => Ok(v),
            other => Err(other.mismatch(field)),
        }
    }

    pub fn into_id(self, field: &str) -> Result<NumericId, HostError> {
        match self {
            FieldValue::Id(v) => Ok(v),
            FieldValue::Int(v) if v >= 0 => Ok(v as NumericId),
            other => Err(other.mismatch(field)),
        }
    }

    pub fn into_asset(self, field: &str) -> Result<String, HostError> {
        match self {
            FieldValue::Asset(v) => Ok(v),
            other => Err(other.mismatch(field)),
        }
    }
}

/// Entry of a nested list on a host record.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEntry {
    /// Stat change applied while the record is in use (gear bonus, consumable change)
    Parameter { stat: String, value: i32 },
    /// Required ingredient of a recipe
    Ingredient { item: NumericId, count: i32 },
}

/// Field names understood by host records.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE_KEY: &str = "title_key";
    pub const DESCRIPTION_KEY: &str = "description_key";
    pub const PRICE: &str = "price";
    pub const WEIGHT: &str = "weight";
    pub const RARE_COLOR: &str = "rare_color";
    pub const SELLABLE: &str = "sellable";
    pub const NOT_FOR_FIRE: &str = "not_for_fire";
    pub const SOUND_TYPE: &str = "sound_type";
    pub const FIRE_RATE: &str = "fire_rate";
    pub const STOCKABLE: &str = "stockable";
    pub const STOCK_COUNT: &str = "stock_count";
    pub const ICON: &str = "icon";
    pub const CATEGORY: &str = "category";
    pub const WARM_RESISTANCE: &str = "warm_resistance";
    pub const WET_RESISTANCE: &str = "wet_resistance";
    pub const DURABILITY_RESISTANCE: &str = "durability_resistance";
    pub const ATTACK: &str = "attack";
    pub const DEFENSE: &str = "defense";
    pub const CRITICAL_CHANCE: &str = "critical_chance";
    pub const MAX_DURABILITY: &str = "max_durability";
    pub const ACTUAL_DURABILITY: &str = "actual_durability";
    pub const CAPACITY: &str = "capacity";

    pub const RECIPE_KIND: &str = "kind";
    pub const INDEX: &str = "index";
    pub const REQUIRED_SKILL: &str = "required_skill";
    pub const ACTIVE: &str = "active";
    pub const DIFFICULTY: &str = "difficulty";
    pub const TITLE: &str = "title";
    pub const RESULT_ITEM: &str = "result_item";
    pub const RESULT_COUNT: &str = "result_count";
    pub const BENCH: &str = "bench";
}

/// Nested list names understood by host records.
pub mod lists {
    pub const CHANGES: &str = "changes";
    pub const BUFF_CHANGES: &str = "buff_changes";
    pub const PARAMETER_CHANGES: &str = "parameter_changes";
    pub const REQUIRE_PRIMARY: &str = "require_primary";
    pub const REQUIRE_SECONDARY: &str = "require_secondary";
}

// ============================================================================
// Records and Tables
// ============================================================================

/// A record stored in a host table, accessed by field name.
pub trait HostRecord {
    /// Host clone. Nested lists may still be shared with `self` afterwards.
    fn clone_record(&self) -> Self
    where
        Self: Sized;

    fn field(&self, name: &str) -> Option<FieldValue>;

    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), HostError>;

    /// Swap the named nested list for a newly allocated empty one.
    fn replace_list(&mut self, name: &str) -> Result<(), HostError>;

    fn push_entry(&mut self, list: &str, entry: ListEntry) -> Result<(), HostError>;
}

/// Concrete shape of a host item record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemVariant {
    Consumable,
    Scrap,
    Gear,
    Weapon,
    Bag,
    Other,
}

pub trait ItemRecord: HostRecord {
    fn variant(&self) -> ItemVariant;
}

pub trait RecipeRecord: HostRecord {
    /// Whether the recipe produces an item (the only kind usable as a template)
    fn is_item_recipe(&self) -> bool;
}

/// Keyed mutable store of host records.
pub trait ContentTable<R> {
    fn name(&self) -> &'static str;

    /// False while the host has not populated the table yet.
    fn is_ready(&self) -> bool;

    fn contains(&self, id: NumericId) -> bool;

    fn get(&self, id: NumericId) -> Option<&R>;

    fn get_mut(&mut self, id: NumericId) -> Option<&mut R>;

    fn set(&mut self, id: NumericId, record: R);

    /// All ids in ascending order.
    fn ids(&self) -> Vec<NumericId>;
}

/// Integer-keyed display strings.
pub trait StringTable {
    fn set_string(&mut self, key: u32, text: String);

    fn get_string(&self, key: u32) -> Option<&str>;
}

/// Borrowed view of the host tables injection writes into.
pub struct HostTables<'a, I, R> {
    pub items: &'a mut dyn ContentTable<I>,
    pub recipes: &'a mut dyn ContentTable<R>,
    pub strings: &'a mut dyn StringTable,
}

// ============================================================================
// Stats
// ============================================================================

/// Character parameters reachable through the stat store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatKind {
    Health,
    Food,
    Morale,
    Grit,
    Stamina,
    Warm,
    Illness,
    Toxicity,
    Wet,
    Freshness,
}

impl StatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Health => "health",
            StatKind::Food => "food",
            StatKind::Morale => "morale",
            StatKind::Grit => "grit",
            StatKind::Stamina => "stamina",
            StatKind::Warm => "warm",
            StatKind::Illness => "illness",
            StatKind::Toxicity => "toxicity",
            StatKind::Wet => "wet",
            StatKind::Freshness => "freshness",
        }
    }
}

/// Current and maximum value of a ranged stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatValue {
    pub current: f64,
    pub max: f64,
}

pub trait StatStore {
    fn stat(&self, stat: StatKind) -> Option<StatValue>;

    fn set_stat(&mut self, stat: StatKind, value: f64);
}

// ============================================================================
// Quests, Recipes Known, Notifications
// ============================================================================

/// Host quest bookkeeping the evaluator reads and drives.
pub trait QuestRuntime {
    /// Quest ids of every instance currently in progress.
    fn in_progress_quests(&self) -> Vec<String>;

    /// Node ids of the instance's in-progress nodes.
    fn in_progress_nodes(&self, quest_id: &str) -> Result<Vec<String>, HostError>;

    fn inventory_count(&self, item: NumericId) -> i32;

    fn mark_node_done(&mut self, quest_id: &str, node_id: &str) -> Result<(), HostError>;
}

/// Recipes the player character knows.
pub trait RecipeBook {
    fn has_recipe(&self, id: NumericId) -> bool;

    fn add_recipe(&mut self, id: NumericId);
}

/// Kind of action reported by the host notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Generic "something happened"; with zero item and count it signals a session load
    All,
    Item,
    Talk,
    Location,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionNotification {
    pub kind: ActionKind,
    pub item_id: NumericId,
    pub count: i32,
    /// Opaque host key, kept for diagnostics
    pub key: String,
}

impl ActionNotification {
    pub fn new(kind: ActionKind, item_id: NumericId, count: i32) -> Self {
        Self {
            kind,
            item_id,
            count,
            key: String::new(),
        }
    }

    /// The notification the host sends after (re)building its tables.
    pub fn session_loaded() -> Self {
        Self::new(ActionKind::All, 0, 0)
    }

    pub fn is_session_reload(&self) -> bool {
        self.kind == ActionKind::All && self.item_id == 0 && self.count == 0
    }

    pub fn is_item_event(&self) -> bool {
        self.kind == ActionKind::Item && self.item_id != 0
    }
}
