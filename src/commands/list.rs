//! List and show commands - inspect the action registry

use colored::Colorize;

use crate::{AutometaError, actions::ActionRegistry, output};

type Result<T> = std::result::Result<T, AutometaError>;

/// Execute the list command
///
/// # Errors
///
/// Never fails today; returns `Result` for symmetry with the other commands.
pub fn execute(registry: &ActionRegistry, quiet: bool) -> Result<()> {
    if registry.is_empty() && registry.disabled().is_empty() {
        if !quiet {
            println!("No actions defined.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Actions (in evaluation order):");
    }
    for action in registry {
        if quiet {
            println!("{}", action.name);
        } else {
            println!(
                "  {} ({} rule(s), {}, {} modification(s))",
                action.name.bold(),
                action.rules.rules.len(),
                action.rules.operator,
                action.modifications.len()
            );
        }
    }

    if !quiet && !registry.disabled().is_empty() {
        println!("Disabled:");
        for d in registry.disabled() {
            println!("  {}", output::diagnostic(d));
        }
    }
    Ok(())
}

/// Execute the show command
///
/// # Errors
///
/// Returns `AutometaError::ActionError` if no enabled action has that name.
pub fn show(registry: &ActionRegistry, name: &str) -> Result<()> {
    print!("{}", registry.to_toml(name)?);
    Ok(())
}
