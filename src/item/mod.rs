//! Items
//!
//! Item definitions, their registry, and injection into the host item table.

pub mod definition;
pub mod inject;
pub mod registry;

pub use definition::{EffectDefinition, GearCategory, ItemDefinition, ItemKind, ItemRef, StatBonus};
pub use inject::{patches_outdated, ItemInjector};
pub use registry::{ItemLookup, ItemRegistry, RegisteredItem};
