//! Output formatting for CLI display

use crate::diagnostics::{Diagnostic, Severity};
use crate::engine::planner::Edit;
use crate::engine::{ActionReport, SkipReason, SkippedAction};
use colored::Colorize;
use std::path::Path;

/// One line summarizing what happened to a file
#[must_use]
pub fn file_summary(path: &Path, changed_by: &[&str], written: bool, quiet: bool) -> String {
    let path_str = path.display().to_string();
    if quiet {
        return path_str;
    }
    match (changed_by.is_empty(), written) {
        (true, _) => format!("  {} (unchanged)", path_str.dimmed()),
        (false, true) => format!("  {} [{}]", path_str.green(), changed_by.join(", ")),
        (false, false) => format!("  {} [{}] (dry run)", path_str.yellow(), changed_by.join(", ")),
    }
}

/// A diagnostic colored by severity
#[must_use]
pub fn diagnostic(d: &Diagnostic) -> String {
    let label = match d.severity {
        Severity::Warning => d.severity.to_string().yellow(),
        Severity::Error => d.severity.to_string().red(),
    };
    match &d.action {
        Some(action) => format!("{label} [{action}]: {}", d.message),
        None => format!("{label}: {}", d.message),
    }
}

fn results(results: &[bool]) -> String {
    results
        .iter()
        .map(|&r| if r { "pass".green().to_string() } else { "fail".red().to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Explanation of an action whose rules passed
#[must_use]
pub fn applied_action(report: &ActionReport) -> String {
    let mut out = format!("{} {}", "✓".green(), report.name.bold());
    if !report.evaluation.results.is_empty() {
        out.push_str(&format!("  rules: {}", results(&report.evaluation.results)));
    }
    if report.edits.is_empty() {
        out.push_str(&format!("\n    {}", "nothing to change".dimmed()));
    }
    for planned in &report.edits {
        out.push_str(&format!("\n    #{}: {}", planned.modification, describe_edit(&planned.edit)));
    }
    out
}

/// Explanation of an action that did not run
#[must_use]
pub fn skipped_action(skipped: &SkippedAction) -> String {
    match &skipped.reason {
        SkipReason::OutOfScope => format!("{} {}  {}", "-".dimmed(), skipped.name, "out of scope".dimmed()),
        SkipReason::RulesFailed { results: r } => {
            format!("{} {}  rules: {}", "✗".red(), skipped.name, results(r))
        }
    }
}

fn describe_edit(edit: &Edit) -> String {
    match edit {
        Edit::SetProperty { key, value } => format!("set {key}: {value}"),
        Edit::RemoveProperty { key } => format!("remove property {key}"),
        Edit::AddTags { tags } => format!("add {}", tags.join(" ")),
        Edit::RemoveTags { tags } => format!("remove {}", tags.join(" ")),
        Edit::AddLinks { targets } => format!("link {}", targets.join(", ")),
        Edit::RemoveLinks { targets } => format!("unlink {}", targets.join(", ")),
    }
}
