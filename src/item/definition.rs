//! Item Definitions
//!
//! Deserialized straight from package documents; fields absent from the
//! document take the documented defaults below.

use serde::{Deserialize, Deserializer};

use crate::host::NumericId;
use crate::registry::Definition;

pub const DEFAULT_BASE_ITEM: NumericId = 1;
pub const DEFAULT_PRICE: i64 = 100;
pub const DEFAULT_WEIGHT: f64 = 0.1;
pub const DEFAULT_DURABILITY: i64 = 100;

fn default_base_item() -> NumericId {
    DEFAULT_BASE_ITEM
}

fn default_price() -> i64 {
    DEFAULT_PRICE
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

fn default_durability() -> i64 {
    DEFAULT_DURABILITY
}

fn default_true() -> bool {
    true
}

fn default_stock_count() -> i64 {
    1
}

fn default_effect_value() -> String {
    "0".to_string()
}

/// Accept `"50"` as well as `50` for effect values.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

// ============================================================================
// Item References
// ============================================================================

/// Reference to an item: a raw host id or a human-readable (possibly qualified) id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Id(NumericId),
    Name(String),
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Id(id) => write!(f, "{}", id),
            ItemRef::Name(name) => f.write_str(name),
        }
    }
}

// ============================================================================
// Item Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Consumable,
    Gear,
    Weapon,
    Bag,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GearCategory {
    Hat,
    #[default]
    Jacket,
    Trousers,
    Shoes,
}

impl GearCategory {
    /// Unknown or empty categories fall back to jacket.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hat" => GearCategory::Hat,
            "jacket" => GearCategory::Jacket,
            "trousers" => GearCategory::Trousers,
            "shoes" => GearCategory::Shoes,
            _ => GearCategory::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GearCategory::Hat => "hat",
            GearCategory::Jacket => "jacket",
            GearCategory::Trousers => "trousers",
            GearCategory::Shoes => "shoes",
        }
    }
}

// ============================================================================
// Sub-definitions
// ============================================================================

/// Stat change applied when a consumable is used
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EffectDefinition {
    #[serde(alias = "type")]
    pub stat: String,
    #[serde(default = "default_effect_value", deserialize_with = "string_or_number")]
    pub value: String,
}

/// Stat bonus granted while gear is worn
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatBonus {
    #[serde(rename = "type")]
    pub stat: String,
    #[serde(default)]
    pub value: i32,
}

// ============================================================================
// Item Definition
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub id: String,
    #[serde(default = "default_base_item")]
    pub base_item: NumericId,
    #[serde(default, rename = "type")]
    pub kind: ItemKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Icon path relative to the package folder
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_price")]
    pub price: i64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub effects: Vec<EffectDefinition>,

    #[serde(default)]
    pub rare_color: i64,
    #[serde(default = "default_true")]
    pub sellable: bool,
    #[serde(default)]
    pub not_for_fire: bool,
    #[serde(default = "default_true")]
    pub is_stockable: bool,
    #[serde(default = "default_stock_count")]
    pub actual_stock_count: i64,
    #[serde(default)]
    pub sound_type: i64,
    #[serde(default)]
    pub firerate: i64,

    /// Copy the icon of this item instead of loading `icon` (0 = none)
    #[serde(default)]
    pub reference_item_id: NumericId,

    /// Patch `target_item_id` in place instead of creating a new item
    #[serde(default)]
    pub is_modify: bool,
    #[serde(default)]
    pub target_item_id: NumericId,

    // Gear
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub warm_resistance: i64,
    #[serde(default)]
    pub wet_resistance: i64,
    #[serde(default = "default_durability")]
    pub durability_resistance: i64,
    #[serde(default)]
    pub stats: Vec<StatBonus>,

    // Weapon
    #[serde(default)]
    pub attack: i64,
    #[serde(default)]
    pub defense: i64,
    #[serde(default)]
    pub critical_chance: i64,
    #[serde(default = "default_durability")]
    pub max_durability: i64,

    // Bag
    #[serde(default)]
    pub bag_capacity: f64,
}

impl ItemDefinition {
    /// Minimal consumable definition with every other field at its default
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            base_item: DEFAULT_BASE_ITEM,
            kind: ItemKind::Consumable,
            name: String::new(),
            description: String::new(),
            icon: String::new(),
            price: DEFAULT_PRICE,
            weight: DEFAULT_WEIGHT,
            effects: Vec::new(),
            rare_color: 0,
            sellable: true,
            not_for_fire: false,
            is_stockable: true,
            actual_stock_count: 1,
            sound_type: 0,
            firerate: 0,
            reference_item_id: 0,
            is_modify: false,
            target_item_id: 0,
            category: String::new(),
            warm_resistance: 0,
            wet_resistance: 0,
            durability_resistance: DEFAULT_DURABILITY,
            stats: Vec::new(),
            attack: 0,
            defense: 0,
            critical_chance: 0,
            max_durability: DEFAULT_DURABILITY,
            bag_capacity: 0.0,
        }
    }

    /// Whether this definition patches an existing host item
    pub fn is_modify_existing(&self) -> bool {
        self.is_modify && self.target_item_id > 0
    }

    pub fn gear_category(&self) -> GearCategory {
        GearCategory::parse(&self.category)
    }
}

impl Definition for ItemDefinition {
    const KIND: &'static str = "item";

    fn id(&self) -> &str {
        &self.id
    }

    fn patch_target(&self) -> Option<NumericId> {
        self.is_modify_existing().then_some(self.target_item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_defaults() {
        let item: ItemDefinition = serde_json::from_str(r#"{ "id": "potion" }"#).unwrap();
        assert_eq!(item.base_item, 1);
        assert_eq!(item.kind, ItemKind::Consumable);
        assert_eq!(item.price, 100);
        assert!((item.weight - 0.1).abs() < f64::EPSILON);
        assert!(item.sellable);
        assert_eq!(item.max_durability, 100);
        assert!(!item.is_modify_existing());
    }

    #[test]
    fn test_parse_gear_item() {
        let item: ItemDefinition = serde_json::from_str(
            r#"{
                "id": "shrek_hoodie",
                "baseItem": 2,
                "type": "gear",
                "category": "HAT",
                "warmResistance": 12,
                "stats": [{ "type": "charisma", "value": 3 }]
            }"#,
        )
        .unwrap();
        assert_eq!(item.kind, ItemKind::Gear);
        assert_eq!(item.gear_category(), GearCategory::Hat);
        assert_eq!(item.warm_resistance, 12);
        assert_eq!(item.stats[0].stat, "charisma");
    }

    #[test]
    fn test_effect_value_and_alias() {
        let item: ItemDefinition = serde_json::from_str(
            r#"{
                "id": "stew",
                "effects": [
                    { "stat": "health", "value": "+10" },
                    { "type": "food", "value": 25 },
                    { "stat": "morale" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(item.effects[0].value, "+10");
        assert_eq!(item.effects[1].stat, "food");
        assert_eq!(item.effects[1].value, "25");
        assert_eq!(item.effects[2].value, "0");
    }

    #[test]
    fn test_unknown_type_is_other() {
        let item: ItemDefinition =
            serde_json::from_str(r#"{ "id": "x", "type": "furniture" }"#).unwrap();
        assert_eq!(item.kind, ItemKind::Other);
    }

    #[test]
    fn test_item_ref_forms() {
        let refs: Vec<ItemRef> = serde_json::from_str(r#"[60001, "pkg:hat", "hat"]"#).unwrap();
        assert_eq!(refs[0], ItemRef::Id(60001));
        assert_eq!(refs[1], ItemRef::Name("pkg:hat".to_string()));
        assert_eq!(refs[2].to_string(), "hat");
    }
}
