//! Action definitions and the action registry
//!
//! An action bundles three things:
//!
//! - **Targets**: which documents it considers (folder, required tags,
//!   required frontmatter keys)
//! - **Rules**: a flat AND/OR group of checks over tags, properties and links
//! - **Modifications**: tags, links and properties to add or remove when the
//!   rules pass
//!
//! # Storage
//!
//! Actions are authored in a TOML registry file, `actions.toml` in the
//! autometa config directory by default:
//!
//! ```toml
//! [[action]]
//! name = "mark-reviewed"
//!
//! [action.targets]
//! parent_folder = "projects"
//!
//! [[action.rules.rule]]
//! attribute = "tag"
//! check = "has"
//! values = ["#reviewed"]
//!
//! [[action.modifications]]
//! attribute = "property"
//! add = true
//! entries = [{ key = "status", value = "reviewed" }]
//! ```
//!
//! # Examples
//!
//! ```
//! use autometa::actions::ActionRegistry;
//!
//! let registry = ActionRegistry::from_toml_str(r#"
//! [[action]]
//! name = "noop"
//! "#).unwrap();
//! assert_eq!(registry.names(), vec!["noop"]);
//! ```

pub mod error;
pub mod registry;
pub mod types;

pub use error::{ActionError, Result};
pub use registry::{ActionRegistry, RegistryFile};
pub use types::{
    Action, ActionDef, Attribute, Check, CheckKind, CountCheck, Modification, Operator,
    PropertyEntry, Rule, RuleDef, RuleGroup, RuleGroupDef, Targets,
};

use std::path::PathBuf;

/// Get the default registry path
///
/// Returns `~/.config/autometa/actions.toml` (platform-specific)
///
/// # Errors
///
/// Returns `ActionError::Io` if the config directory cannot be determined
pub fn default_registry_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        ActionError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ))
    })?;

    Ok(config_dir.join("autometa").join("actions.toml"))
}
