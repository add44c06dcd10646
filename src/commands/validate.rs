//! Validate command - report actions disabled by configuration errors

use std::path::Path;

use colored::Colorize;

use crate::{AutometaError, actions::ActionRegistry, output};

type Result<T> = std::result::Result<T, AutometaError>;

/// Execute the validate command
///
/// # Errors
///
/// Returns `AutometaError::InvalidInput` if any action was disabled.
pub fn execute(path: &Path, registry: &ActionRegistry, quiet: bool) -> Result<()> {
    let disabled = registry.disabled();
    for d in disabled {
        eprintln!("{}", output::diagnostic(d));
    }

    if !disabled.is_empty() {
        return Err(AutometaError::InvalidInput(format!(
            "{} action(s) in {} are disabled",
            disabled.len(),
            path.display()
        )));
    }

    if !quiet {
        println!(
            "{} {} action(s) in {} are valid",
            "✓".green(),
            registry.len(),
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::registry_from_toml;

    #[test]
    fn test_validate_fails_on_disabled_action() {
        let registry = registry_from_toml(
            r#"
[[action]]
name = "broken"

[[action.rules.rule]]
attribute = "tag"
check = "equal"
"#,
        );
        let result = execute(Path::new("actions.toml"), &registry, true);
        assert!(matches!(result, Err(AutometaError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_accepts_valid_registry() {
        let registry = registry_from_toml("[[action]]\nname = \"fine\"\n");
        assert!(execute(Path::new("actions.toml"), &registry, true).is_ok());
    }
}
