//! Autometa - rule-driven metadata automation for markdown notes
//!
//! Actions pair a scope (folder, required tags and frontmatter keys) and a
//! flat AND/OR rule group with a list of tag, link and property
//! modifications. The [`engine`] evaluates every action against a document
//! and returns either "no change" or the full rewritten text.

use thiserror::Error;

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod engine;
pub mod frontmatter;
pub mod inline;
pub mod lock;
pub mod output;

#[cfg(test)]
pub mod testing;

pub use actions::{ActionError, ActionRegistry};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use document::{Document, Metadata};
pub use engine::{Change, Engine, EngineOptions, Outcome, TagStyle};

/// Error enum, contains all failure states of the program
#[derive(Debug, Error)]
pub enum AutometaError {
    /// Action registry error
    #[error("Action error: {0}")]
    ActionError(#[from] ActionError),
    /// Represents a configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// Represents an I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    /// Invalid glob pattern
    #[error("Invalid pattern: {0}")]
    PatternError(#[from] glob::PatternError),
    /// JSON rendering error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
