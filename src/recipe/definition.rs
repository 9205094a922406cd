//! Recipe Definitions

use serde::Deserialize;

use crate::host::NumericId;
use crate::item::ItemRef;
use crate::registry::Definition;

fn default_count() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_bench() -> String {
    "none".to_string()
}

/// Crafting station a recipe requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BenchType {
    #[default]
    Nothing,
    Normal,
    Kitchen,
    DrugLab,
}

impl BenchType {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" | "nothing" => BenchType::Nothing,
            "normal" => BenchType::Normal,
            "kitchen" => BenchType::Kitchen,
            "druglab" | "drug" => BenchType::DrugLab,
            _ => BenchType::Nothing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchType::Nothing => "nothing",
            BenchType::Normal => "normal",
            BenchType::Kitchen => "kitchen",
            BenchType::DrugLab => "drug_lab",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngredientDefinition {
    pub item: ItemRef,
    #[serde(default = "default_count")]
    pub count: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDefinition {
    pub id: String,
    /// Item produced by the recipe
    pub result: ItemRef,
    #[serde(default = "default_count")]
    pub result_count: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_bench")]
    pub bench: String,
    #[serde(default)]
    pub skill_required: i64,
    #[serde(default = "default_true")]
    pub auto_unlock: bool,
    /// Host recipe to clone; the first item recipe in the table when absent
    #[serde(default)]
    pub base_recipe: Option<NumericId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDefinition>,
}

impl RecipeDefinition {
    pub fn new(id: &str, result: ItemRef) -> Self {
        Self {
            id: id.to_string(),
            result,
            result_count: 1,
            name: String::new(),
            bench: default_bench(),
            skill_required: 0,
            auto_unlock: true,
            base_recipe: None,
            ingredients: Vec::new(),
        }
    }

    pub fn bench_type(&self) -> BenchType {
        BenchType::parse(&self.bench)
    }
}

impl Definition for RecipeDefinition {
    const KIND: &'static str = "recipe";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipe() {
        let recipe: RecipeDefinition = serde_json::from_str(
            r#"{
                "id": "stew_recipe",
                "result": "stew",
                "name": "@stew.recipe",
                "bench": "Kitchen",
                "skillRequired": 2,
                "ingredients": [
                    { "item": 5, "count": 3 },
                    { "item": "onion" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.result, ItemRef::Name("stew".to_string()));
        assert_eq!(recipe.bench_type(), BenchType::Kitchen);
        assert_eq!(recipe.skill_required, 2);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].item, ItemRef::Id(5));
        assert_eq!(recipe.ingredients[1].count, 1);
    }

    #[test]
    fn test_recipe_defaults() {
        let recipe: RecipeDefinition =
            serde_json::from_str(r#"{ "id": "minimal", "result": 60000 }"#).unwrap();
        assert_eq!(recipe.result_count, 1);
        assert!(recipe.auto_unlock);
        assert_eq!(recipe.bench_type(), BenchType::Nothing);
        assert!(recipe.base_recipe.is_none());
    }

    #[test]
    fn test_bench_aliases() {
        assert_eq!(BenchType::parse("drug"), BenchType::DrugLab);
        assert_eq!(BenchType::parse("DrugLab"), BenchType::DrugLab);
        assert_eq!(BenchType::parse("workbench"), BenchType::Nothing);
    }
}
