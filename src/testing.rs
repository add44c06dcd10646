//! Testing utilities for autometa
//!
//! Helpers for building action registries and temporary note vaults.
//!
//! Only available when compiled with `cfg(test)`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::actions::{ActionDef, ActionRegistry, Modification, RuleGroupDef, Targets};

/// A temporary directory of notes that is removed on drop
pub struct TempVault {
    dir: TempDir,
}

impl TempVault {
    /// Create an empty vault
    ///
    /// # Panics
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp vault"),
        }
    }

    /// Vault root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a note relative to the root
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a note, creating parent folders
    ///
    /// # Panics
    /// Panics if the note cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create note folder");
        }
        fs::write(&path, contents).expect("Failed to write note");
        path
    }

    /// Read a note back
    ///
    /// # Panics
    /// Panics if the note cannot be read.
    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("Failed to read note")
    }
}

impl Default for TempVault {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an action definition
#[must_use]
pub fn action(
    name: &str,
    targets: Targets,
    rules: RuleGroupDef,
    modifications: Vec<Modification>,
) -> ActionDef {
    ActionDef {
        name: name.to_string(),
        targets,
        rules,
        modifications,
    }
}

/// Build a registry from definitions
#[must_use]
pub fn registry(defs: Vec<ActionDef>) -> ActionRegistry {
    ActionRegistry::from_defs(defs)
}

/// Parse a registry from TOML
///
/// # Panics
/// Panics if the TOML is not a valid registry file.
#[must_use]
pub fn registry_from_toml(toml: &str) -> ActionRegistry {
    ActionRegistry::from_toml_str(toml).expect("Failed to parse test registry")
}
