//! Check command - explain what each action would do to a file

use std::fs;
use std::path::Path;

use colored::Colorize;

use super::document_path;
use crate::{
    AutometaError,
    actions::ActionRegistry,
    document::Document,
    engine::{Engine, Outcome},
    output,
};

type Result<T> = std::result::Result<T, AutometaError>;

/// Evaluate `file` without writing it
///
/// # Errors
///
/// Returns `AutometaError::IoError` if the file cannot be read.
pub fn explain(engine: &Engine, registry: &ActionRegistry, file: &Path, root: Option<&Path>) -> Result<Outcome> {
    let text = fs::read_to_string(file)?;
    let document = Document::from_text(document_path(file, root), text);
    Ok(engine.evaluate_and_mutate(registry, &document))
}

/// Execute the check command
///
/// # Errors
///
/// Returns `AutometaError` if the file cannot be read.
pub fn execute(
    engine: &Engine,
    registry: &ActionRegistry,
    file: &Path,
    root: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let outcome = explain(engine, registry, file, root)?;

    if registry.is_empty() {
        if !quiet {
            println!("No actions defined.");
        }
        return Ok(());
    }

    for name in registry.names() {
        if let Some(report) = outcome.applied.iter().find(|r| r.name == name) {
            println!("{}", output::applied_action(report));
        } else if let Some(skipped) = outcome.skipped.iter().find(|s| s.name == name) {
            println!("{}", output::skipped_action(skipped));
        }
    }

    for d in &outcome.diagnostics {
        eprintln!("{}", output::diagnostic(d));
    }

    if !quiet {
        match outcome.text() {
            Some(_) => println!("\n{} would be rewritten by: {}", file.display(), outcome.changed_by().join(", ").bold()),
            None => println!("\n{} would not change", file.display()),
        }
    }
    Ok(())
}
