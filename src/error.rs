//! Error Types
//!
//! Every fallible step in loading, registration, and injection returns one
//! of these. Public entry points on the framework log them and carry on.

use std::path::PathBuf;

use thiserror::Error;

use crate::host::NumericId;

/// Errors raised while reading package documents.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("package folder {0:?} has no manifest")]
    MissingManifest(PathBuf),

    #[error("unsupported document format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("failed to parse {file:?}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised when a definition cannot be registered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegisterError {
    #[error("{kind} definition in package '{package}' has an empty id")]
    EmptyId { kind: &'static str, package: String },
}

/// Errors raised by the host adapter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("record has no field '{0}'")]
    UnknownField(String),

    #[error("field '{field}' does not accept {given}")]
    FieldType { field: String, given: &'static str },

    #[error("record has no list '{0}'")]
    UnknownList(String),

    #[error("quest '{0}' is not known to the host")]
    UnknownQuest(String),

    #[error("quest '{quest}' has no node '{node}'")]
    UnknownNode { quest: String, node: String },
}

/// Errors raised while injecting one registered entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InjectError {
    #[error("{0} table is not ready")]
    TableNotReady(&'static str),

    #[error("base record {base} not found for '{entry}'")]
    BaseMissing { entry: String, base: NumericId },

    #[error("modify target {target} not found for '{entry}'")]
    TargetMissing { entry: String, target: NumericId },

    #[error("no template recipe available for '{0}'")]
    TemplateMissing(String),

    #[error("result item '{result}' not found for recipe '{entry}'")]
    ResultUnresolved { entry: String, result: String },

    #[error("ingredient '{item}' not found for recipe '{entry}'")]
    IngredientUnresolved { entry: String, item: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_error_display() {
        let err = InjectError::BaseMissing {
            entry: "demo:potion".to_string(),
            base: 7,
        };
        let text = err.to_string();
        assert!(text.contains("demo:potion"));
        assert!(text.contains('7'));
    }

    #[test]
    fn test_host_error_converts() {
        let err: InjectError = HostError::UnknownField("price".to_string()).into();
        assert!(matches!(err, InjectError::Host(HostError::UnknownField(_))));
    }
}
