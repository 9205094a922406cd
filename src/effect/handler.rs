//! Effect Handler
//!
//! Applies the effects of registered items to the character's stats and
//! renders them for tooltips.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::host::{NumericId, StatKind, StatStore};
use crate::item::{EffectDefinition, ItemRegistry};

use super::expr::{format_value, EffectExpr};

const BUILTIN_ALIASES: &[(&str, StatKind)] = &[
    ("health", StatKind::Health),
    ("food", StatKind::Food),
    ("morale", StatKind::Morale),
    ("energy", StatKind::Grit),
    ("grit", StatKind::Grit),
    ("stamina", StatKind::Stamina),
    ("fatigue", StatKind::Stamina),
    ("tiredness", StatKind::Stamina),
    ("warmth", StatKind::Warm),
    ("warm", StatKind::Warm),
    ("illness", StatKind::Illness),
    ("toxicity", StatKind::Toxicity),
    ("wet", StatKind::Wet),
    ("wetness", StatKind::Wet),
    ("dryness", StatKind::Wet),
    ("freshness", StatKind::Freshness),
    ("odour", StatKind::Freshness),
    ("odor", StatKind::Freshness),
    ("smell", StatKind::Freshness),
];

/// One tooltip line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectLine {
    pub label: String,
    pub value: String,
}

pub struct EffectHandler {
    aliases: HashMap<String, StatKind>,
}

impl EffectHandler {
    pub fn new() -> Self {
        let aliases = BUILTIN_ALIASES
            .iter()
            .map(|(name, stat)| (name.to_string(), *stat))
            .collect();
        Self { aliases }
    }

    /// Map an additional effect name onto a stat. Names are case-insensitive.
    pub fn register_alias(&mut self, name: &str, stat: StatKind) {
        self.aliases.insert(name.to_lowercase(), stat);
    }

    pub fn stat_for(&self, name: &str) -> Option<StatKind> {
        self.aliases.get(&name.trim().to_lowercase()).copied()
    }

    /// Apply one effect. Returns false when the stat is unknown or absent
    /// from the store.
    pub fn apply_effect(&self, effect: &EffectDefinition, stats: &mut dyn StatStore) -> bool {
        let Some(stat) = self.stat_for(&effect.stat) else {
            warn!("Unknown stat: {}", effect.stat);
            return false;
        };
        let Some(value) = stats.stat(stat) else {
            warn!("Stat {} not available on character", stat.as_str());
            return false;
        };

        let expr = EffectExpr::parse(&effect.value);
        if !expr.is_valid() {
            warn!(
                "Unparseable value '{}' for {}, leaving unchanged",
                effect.value, effect.stat
            );
        }
        let updated = expr.apply(value.current, value.max);
        stats.set_stat(stat, updated);
        info!("  {} -> {} ({} => {})", effect.stat, effect.value, value.current, updated);
        true
    }

    /// Apply every effect of the item registered under `item_id`, in order.
    /// Returns false if the id is not a registered item.
    pub fn apply_item_effects(
        &self,
        items: &ItemRegistry,
        item_id: NumericId,
        stats: &mut dyn StatStore,
    ) -> bool {
        let Some(entry) = items.lookup_by_numeric_id(item_id) else {
            return false;
        };

        info!("Applying effects for {}", entry.key);
        for effect in &entry.definition.effects {
            self.apply_effect(effect, stats);
        }
        true
    }

    /// Tooltip lines for the item registered under `item_id`.
    pub fn describe_effects(&self, items: &ItemRegistry, item_id: NumericId) -> Option<Vec<EffectLine>> {
        let effects = items.effects_of(item_id)?;
        Some(
            effects
                .iter()
                .map(|effect| EffectLine {
                    label: display_name(&effect.stat),
                    value: format_value(&effect.value),
                })
                .collect(),
        )
    }
}

impl Default for EffectHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// UI label for an effect stat name.
pub fn display_name(stat: &str) -> String {
    let label = match stat.to_lowercase().as_str() {
        "health" => "Health",
        "food" => "Food",
        "morale" => "Morale",
        "freshness" => "Freshness",
        "warmth" => "Warmth",
        "stamina" => "Stamina",
        "illness" => "Illness",
        "toxicity" => "Toxicity",
        "wet" => "Wetness",
        "" => "Unknown",
        _ => return stat.to_string(),
    };
    label.to_string()
}

/// Canonical host parameter name for a gear stat bonus.
pub fn canonical_parameter(name: &str) -> Option<&'static str> {
    let canonical = match name.trim().to_lowercase().as_str() {
        "health" => "health",
        "food" => "food",
        "morale" => "morale",
        "freshness" | "odour" => "freshness",
        "warm" | "warmth" => "warm",
        "wet" | "dryness" => "wet",
        "illness" => "illness",
        "toxicity" => "toxicity",
        "alcohol" => "alcohol",
        "greatneed" => "greatneed",
        "smell" => "smell",
        "smellresistance" => "smell_resistance",
        "wetresistance" => "wet_resistance",
        "warmresistance" => "warm_resistance",
        "toxicityresistance" => "toxicity_resistance",
        "immunity" => "immunity",
        "attack" => "attack",
        "defense" => "defense",
        "charism" | "charisma" => "charism",
        "capacity" => "capacity",
        "stamina" => "stamina",
        "gearsmell" => "gear_smell",
        "grit" | "energy" => "grit",
        "gritmax" => "grit_max",
        "courage" => "courage",
        "couragemax" => "courage_max",
        _ => return None,
    };
    Some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryStats;
    use crate::item::ItemDefinition;
    use crate::package::PackageInfo;
    use std::rc::Rc;

    fn effect(stat: &str, value: &str) -> EffectDefinition {
        EffectDefinition {
            stat: stat.to_string(),
            value: value.to_string(),
        }
    }

    fn stats() -> MemoryStats {
        let mut stats = MemoryStats::default();
        stats.insert(StatKind::Health, 40.0, 100.0);
        stats.insert(StatKind::Grit, 10.0, 80.0);
        stats
    }

    #[test]
    fn test_aliases_are_case_insensitive() {
        let handler = EffectHandler::new();
        assert_eq!(handler.stat_for("Energy"), Some(StatKind::Grit));
        assert_eq!(handler.stat_for("ODOR"), Some(StatKind::Freshness));
        assert_eq!(handler.stat_for("mana"), None);
    }

    #[test]
    fn test_apply_effect_writes_back() {
        let handler = EffectHandler::new();
        let mut stats = stats();
        assert!(handler.apply_effect(&effect("health", "+15"), &mut stats));
        assert!(handler.apply_effect(&effect("energy", "max"), &mut stats));
        assert_eq!(stats.current(StatKind::Health), Some(55.0));
        assert_eq!(stats.current(StatKind::Grit), Some(80.0));
    }

    #[test]
    fn test_unknown_stat_is_noop() {
        let handler = EffectHandler::new();
        let mut stats = stats();
        assert!(!handler.apply_effect(&effect("mana", "max"), &mut stats));
        // Known alias, but not tracked by this store
        assert!(!handler.apply_effect(&effect("food", "max"), &mut stats));
        assert_eq!(stats.current(StatKind::Health), Some(40.0));
    }

    #[test]
    fn test_register_alias() {
        let mut handler = EffectHandler::new();
        handler.register_alias("HP", StatKind::Health);
        let mut stats = stats();
        assert!(handler.apply_effect(&effect("hp", "min"), &mut stats));
        assert_eq!(stats.current(StatKind::Health), Some(0.0));
    }

    #[test]
    fn test_apply_item_effects_and_describe() {
        let mut items = ItemRegistry::new(60000);
        let mut stew = ItemDefinition::new("stew");
        stew.effects = vec![effect("health", "20"), effect("mana", "+1"), effect("grit", "-5")];
        let id = items
            .register(&Rc::new(PackageInfo::inline("p")), stew)
            .unwrap();

        let handler = EffectHandler::new();
        let mut stats = stats();
        assert!(handler.apply_item_effects(&items, id, &mut stats));
        assert!(!handler.apply_item_effects(&items, 1, &mut stats));
        assert_eq!(stats.current(StatKind::Health), Some(20.0));
        assert_eq!(stats.current(StatKind::Grit), Some(5.0));

        let lines = handler.describe_effects(&items, id).unwrap();
        assert_eq!(lines[0], EffectLine { label: "Health".into(), value: "+20".into() });
        assert_eq!(lines[1].label, "mana");
        assert_eq!(lines[2].value, "-5");
    }

    #[test]
    fn test_canonical_parameter() {
        assert_eq!(canonical_parameter("Charisma"), Some("charism"));
        assert_eq!(canonical_parameter("energy"), Some("grit"));
        assert_eq!(canonical_parameter("luck"), None);
    }
}
