//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and runs the operation against the action registry.

pub mod check;
pub mod completions;
pub mod config;
pub mod list;
pub mod run;
pub mod validate;

pub use check::execute as check;
pub use completions::execute as completions;
pub use config::execute as config;
pub use list::{execute as list, show};
pub use run::execute as run;
pub use validate::execute as validate;

use std::path::{Component, Path, PathBuf};

use crate::{AutometaError, actions::ActionRegistry, config::AutometaConfig};

type Result<T> = std::result::Result<T, AutometaError>;

/// Resolve the registry path (CLI flag, then config) and load it
///
/// # Errors
///
/// Returns `AutometaError` if the path cannot be determined or the file
/// cannot be read or parsed.
pub fn load_registry(
    override_path: Option<&Path>,
    config: &AutometaConfig,
) -> Result<(PathBuf, ActionRegistry)> {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => config.registry_path()?,
    };
    let registry = ActionRegistry::load(&path)?;
    Ok((path, registry))
}

/// Path of `file` as the engine sees it: relative to `root`, `.` components dropped
#[must_use]
pub fn document_path(file: &Path, root: Option<&Path>) -> PathBuf {
    let relative = root
        .and_then(|r| file.strip_prefix(r).ok())
        .unwrap_or(file);
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
