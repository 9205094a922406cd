//! Recipes
//!
//! Crafting recipes declared by packages, cloned from an item-type host
//! recipe and unlocked for the player on session load.

pub mod definition;
pub mod inject;
pub mod registry;

pub use definition::{BenchType, IngredientDefinition, RecipeDefinition};
pub use inject::RecipeInjector;
pub use registry::{RecipeRegistry, RegisteredRecipe};
