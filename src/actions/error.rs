//! Error types for action definitions and the action registry
//!
//! Validation errors disable a single action; they never abort loading the
//! rest of the registry. I/O and TOML errors concern the registry file as a
//! whole.

use super::types::{Attribute, CheckKind};
use std::io;
use thiserror::Error;

/// Errors that can occur while loading or validating actions
#[derive(Debug, Error)]
pub enum ActionError {
    /// Action name is empty
    #[error("Action name must not be empty")]
    EmptyName,

    /// Another action with the same name was defined earlier
    #[error("Action '{0}' is defined more than once")]
    DuplicateName(String),

    /// `values` given to a count-based check
    #[error("Action '{action}', rule {rule}: `values` is not valid for a `{check}` check")]
    UnexpectedValues {
        action: String,
        rule: usize,
        check: CheckKind,
    },

    /// `count` given to a `has` check
    #[error("Action '{action}', rule {rule}: `count` is not valid for a `has` check")]
    UnexpectedCount { action: String, rule: usize },

    /// Count-based check without a `count`
    #[error("Action '{action}', rule {rule}: a `{check}` check requires `count`")]
    MissingCount {
        action: String,
        rule: usize,
        check: CheckKind,
    },

    /// A modification names an empty tag, link or property key
    #[error("Action '{action}', modification {modification}: empty {attribute} identifier")]
    EmptyIdentifier {
        action: String,
        modification: usize,
        attribute: Attribute,
    },

    /// Action not found in the registry
    #[error("Action '{0}' not found")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Registry file could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Registry could not be serialized
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Type alias for cleaner function signatures
pub type Result<T> = std::result::Result<T, ActionError>;
