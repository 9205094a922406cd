//! Declarative content injection.
//!
//! Packages describe items, recipes, and quests as JSON or TOML documents.
//! The [`Framework`] registers them under stable numeric ids and merges them
//! into a host's live content tables, as many times as the host rebuilds
//! those tables.

pub mod config;
pub mod effect;
pub mod error;
pub mod framework;
pub mod host;
pub mod item;
pub mod markers;
pub mod package;
pub mod quest;
pub mod recipe;
pub mod registry;

pub use config::{FrameworkConfig, IdRanges};
pub use error::{HostError, InjectError, LoadError, RegisterError};
pub use framework::{ActionReport, DiscoveryReport, Framework};
pub use registry::InjectReport;
