//! Stat Effects
//!
//! Value expressions applied to character stats when a registered item is
//! used.

pub mod expr;
pub mod handler;

pub use expr::{apply, format_value, EffectExpr};
pub use handler::{canonical_parameter, display_name, EffectHandler, EffectLine};
