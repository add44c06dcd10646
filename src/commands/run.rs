//! Run command - evaluate actions against files and write results back

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use super::document_path;
use crate::{
    AutometaError,
    actions::ActionRegistry,
    document::Document,
    engine::{Engine, Outcome},
    lock::DocumentLocks,
    output,
};

type Result<T> = std::result::Result<T, AutometaError>;

/// Extension of the files a directory expands to
const NOTE_EXTENSION: &str = "md";

/// Options for a run over files
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub root: Option<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
}

/// What happened to one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub written: bool,
    pub outcome: Outcome,
}

/// Expand files, directories and glob patterns into a sorted file list
///
/// Directories expand to every `.md` file beneath them.
///
/// # Errors
///
/// Returns `AutometaError::PatternError` for an invalid glob and
/// `AutometaError::InvalidInput` for a path that does not exist.
pub fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            let nested = path.join("**").join(format!("*.{NOTE_EXTENSION}"));
            files.extend(glob_files(&nested.to_string_lossy())?);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else if pattern.contains(['*', '?', '[']) {
            files.extend(glob_files(pattern)?);
        } else {
            return Err(AutometaError::InvalidInput(format!("No such file or directory: {pattern}")));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn glob_files(pattern: &str) -> Result<Vec<PathBuf>> {
    Ok(glob::glob(pattern)?
        .filter_map(std::result::Result::ok)
        .filter(|p| p.is_file())
        .collect())
}

/// Evaluate one file, writing it back when it changed
///
/// # Errors
///
/// Returns `AutometaError::IoError` if the file cannot be read or written.
pub fn process_file(
    engine: &Engine,
    registry: &ActionRegistry,
    file: &Path,
    options: &RunOptions,
) -> Result<FileReport> {
    let text = fs::read_to_string(file)?;
    let document = Document::from_text(document_path(file, options.root.as_deref()), text);
    let outcome = engine.evaluate_and_mutate(registry, &document);

    let written = match outcome.text() {
        Some(new_text) if !options.dry_run => {
            fs::write(file, new_text)?;
            true
        }
        _ => false,
    };

    Ok(FileReport {
        path: file.to_path_buf(),
        written,
        outcome,
    })
}

/// Process `files` in parallel, one evaluation per file at a time
#[must_use]
pub fn process_files(
    engine: &Engine,
    registry: &ActionRegistry,
    files: &[PathBuf],
    options: &RunOptions,
) -> Vec<(PathBuf, Result<FileReport>)> {
    let locks = DocumentLocks::new();
    files
        .par_iter()
        .map(|file| {
            let result = locks.with_lock(file, || process_file(engine, registry, file, options));
            (file.clone(), result)
        })
        .collect()
}

/// Execute the run command
///
/// # Errors
///
/// Returns `AutometaError` if the inputs cannot be expanded, JSON cannot be
/// rendered, or any file failed to process.
pub fn execute(
    engine: &Engine,
    registry: &ActionRegistry,
    patterns: &[String],
    options: &RunOptions,
    quiet: bool,
) -> Result<()> {
    let files = collect_files(patterns)?;
    if files.is_empty() {
        if !quiet {
            println!("No files matched.");
        }
        return Ok(());
    }

    let mut failed = 0;
    let mut changed = 0;
    for (file, result) in process_files(engine, registry, &files, options) {
        match result {
            Ok(report) => {
                if report.outcome.is_changed() {
                    changed += 1;
                }
                if options.json {
                    println!("{}", serde_json::to_string(&report)?);
                } else if report.outcome.is_changed() || !quiet {
                    println!(
                        "{}",
                        output::file_summary(&report.path, &report.outcome.changed_by(), report.written, quiet)
                    );
                    if !quiet {
                        for d in &report.outcome.diagnostics {
                            eprintln!("    {}", output::diagnostic(d));
                        }
                    }
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}: {e}", file.display());
            }
        }
    }

    if !quiet && !options.json {
        let verb = if options.dry_run { "would change" } else { "changed" };
        println!("{} file(s) processed, {changed} {verb}", files.len());
    }

    if failed > 0 {
        return Err(AutometaError::InvalidInput(format!("{failed} file(s) could not be processed")));
    }
    Ok(())
}
