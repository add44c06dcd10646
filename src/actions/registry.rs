//! The action registry
//!
//! An ordered, read-only mapping from action name to validated [`Action`].
//! Iteration order is the order actions were defined in, which makes a pass
//! over several actions that touch the same document reproducible.
//!
//! Invalid actions never make loading fail. They are left out and reported
//! through [`ActionRegistry::disabled`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ActionError, Result};
use super::types::{Action, ActionDef};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

/// On-disk layout of a registry file: an `[[action]]` array of tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionDef>,
}

/// Ordered collection of validated actions
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
    defs: Vec<ActionDef>,
    disabled: Diagnostics,
    /// Every name defined so far, including disabled actions
    seen: HashSet<String>,
}

impl ActionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from authored definitions, disabling invalid ones
    pub fn from_defs<I>(defs: I) -> Self
    where
        I: IntoIterator<Item = ActionDef>,
    {
        let mut registry = Self::new();
        for def in defs {
            registry.insert(def);
        }
        registry
    }

    /// Parse a registry from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Toml` if the text is not a valid registry file.
    /// Individual invalid actions do not produce an error.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(contents)?;
        Ok(Self::from_defs(file.actions))
    }

    /// Load a registry file
    ///
    /// A missing file yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Registry file not found, using empty registry");
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let registry = Self::from_toml_str(&contents)?;
        tracing::debug!(
            path = %path.display(),
            enabled = registry.len(),
            disabled = registry.disabled.len(),
            "Registry loaded"
        );
        Ok(registry)
    }

    fn insert(&mut self, def: ActionDef) {
        let name = def.name.trim().to_string();
        let duplicate = !name.is_empty() && !self.seen.insert(name.clone());
        let result = if duplicate {
            Err(ActionError::DuplicateName(name.clone()))
        } else {
            Action::try_from(def.clone())
        };

        match result {
            Ok(action) => {
                self.actions.push(action);
                self.defs.push(def);
            }
            Err(e) => {
                let mut diagnostic = Diagnostic::error(
                    DiagnosticKind::Configuration,
                    format!("action disabled: {e}"),
                );
                if !name.is_empty() {
                    diagnostic = diagnostic.for_action(&name);
                }
                self.disabled.push(diagnostic);
            }
        }
    }

    /// Get an action by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Get the authored definition of an enabled action
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` if no enabled action has that name.
    pub fn definition(&self, name: &str) -> Result<&ActionDef> {
        self.actions
            .iter()
            .position(|a| a.name == name)
            .map(|i| &self.defs[i])
            .ok_or_else(|| ActionError::NotFound(name.to_string()))
    }

    /// Check if an enabled action with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Enabled actions in definition order
    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    /// Names of enabled actions in definition order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Diagnostics for every action that failed validation
    #[must_use]
    pub const fn disabled(&self) -> &Diagnostics {
        &self.disabled
    }

    /// Render an action definition back to TOML
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the action is unknown or cannot be serialized.
    pub fn to_toml(&self, name: &str) -> Result<String> {
        let def = self.definition(name)?.clone();
        let file = RegistryFile { actions: vec![def] };
        Ok(toml::to_string_pretty(&file)?)
    }
}

impl<'a> IntoIterator for &'a ActionRegistry {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::types::{Attribute, Check, Modification, Operator};
    use tempfile::TempDir;

    const REGISTRY: &str = r##"
[[action]]
name = "archive-done"

[action.targets]
parent_folder = "projects/"
required_tags = ["#active"]

[action.rules]
operator = "or"

[[action.rules.rule]]
attribute = "property"
check = "has"
values = ["done"]

[[action.rules.rule]]
attribute = "tag"
check = "greater_than"
count = 2
negate = true

[[action.modifications]]
attribute = "tag"
add = true
tags = ["archived"]

[[action.modifications]]
attribute = "property"
add = true
entries = [{ key = "status", value = "archived" }]

[[action]]
name = "broken"

[[action.rules.rule]]
attribute = "link"
check = "equal"
values = ["x"]

[[action]]
name = "archive-done"
"##;

    #[test]
    fn test_parse_registry() {
        let registry = ActionRegistry::from_toml_str(REGISTRY).unwrap();
        assert_eq!(registry.names(), vec!["archive-done"]);

        let action = registry.get("archive-done").unwrap();
        assert_eq!(action.targets.parent_folder.as_deref(), Some("projects/"));
        assert_eq!(action.rules.operator, Operator::Or);
        assert_eq!(action.rules.rules.len(), 2);
        assert_eq!(action.rules.rules[1].attribute, Attribute::Tag);
        assert_eq!(action.rules.rules[1].check, Check::GreaterThan(2));
        assert!(action.rules.rules[1].negate);
        assert_eq!(
            action.modifications[0],
            Modification::Tag { add: true, tags: vec!["#archived".to_string()] }
        );
    }

    #[test]
    fn test_invalid_and_duplicate_actions_are_disabled() {
        let registry = ActionRegistry::from_toml_str(REGISTRY).unwrap();
        let disabled: Vec<_> = registry
            .disabled()
            .iter()
            .map(|d| d.action.clone().unwrap())
            .collect();
        assert_eq!(disabled, vec!["broken".to_string(), "archive-done".to_string()]);
        assert!(registry.disabled().iter().all(|d| d.kind == DiagnosticKind::Configuration));
    }

    #[test]
    fn test_name_of_disabled_action_stays_taken() {
        let registry = ActionRegistry::from_toml_str(
            r#"
[[action]]
name = "x"

[[action.rules.rule]]
attribute = "tag"
check = "equal"

[[action]]
name = "x"
"#,
        )
        .unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.disabled().len(), 2);
        let last = registry.disabled().iter().last().unwrap();
        assert_eq!(last.action.as_deref(), Some("x"));
        assert!(last.message.contains("defined more than once"), "{}", last.message);
    }

    #[test]
    fn test_definition_order_is_preserved() {
        let registry = ActionRegistry::from_toml_str(
            "[[action]]\nname = \"z\"\n[[action]]\nname = \"a\"\n[[action]]\nname = \"m\"\n",
        )
        .unwrap();
        assert_eq!(registry.names(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let registry = ActionRegistry::load(&temp_dir.path().join("actions.toml")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("actions.toml");
        fs::write(&path, "[[action]\nname = ").unwrap();
        assert!(matches!(ActionRegistry::load(&path), Err(ActionError::Toml(_))));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let registry = ActionRegistry::from_toml_str(REGISTRY).unwrap();
        let rendered = registry.to_toml("archive-done").unwrap();
        let reparsed = ActionRegistry::from_toml_str(&rendered).unwrap();
        assert_eq!(reparsed.get("archive-done"), registry.get("archive-done"));
        assert!(matches!(registry.to_toml("nope"), Err(ActionError::NotFound(_))));
    }
}
