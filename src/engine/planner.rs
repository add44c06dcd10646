//! Modification planning
//!
//! A plan is computed against a frozen snapshot of the document's metadata:
//! every "is it already there?" decision for an action consults the metadata
//! as it was before that action's first modification. Edits that would be
//! no-ops against the snapshot are dropped, and the surviving edits are
//! applied in modification order.

use crate::actions::{Attribute, Modification, PropertyEntry};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::document::{Metadata, bare_tag, normalize_link, normalize_tag};
use crate::inline;
use serde::Serialize;
use std::collections::BTreeSet;

/// A concrete change to make to the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "edit", rename_all = "snake_case")]
pub enum Edit {
    SetProperty { key: String, value: String },
    RemoveProperty { key: String },
    AddTags { tags: Vec<String> },
    RemoveTags { tags: Vec<String> },
    AddLinks { targets: Vec<String> },
    RemoveLinks { targets: Vec<String> },
}

/// An edit and the 1-based index of the modification it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedEdit {
    pub modification: usize,
    #[serde(flatten)]
    pub edit: Edit,
}

/// Edits for one action plus the metadata they produce
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub edits: Vec<PlannedEdit>,
    /// The snapshot with every planned edit applied
    pub metadata: Metadata,
}

impl Plan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Why an identifier cannot be written into a document
///
/// Added tags must read back as the same single inline token, otherwise a
/// second pass would not see them and would add them again.
fn invalid_identifier(attribute: Attribute, value: &str, add: bool) -> Option<&'static str> {
    match attribute {
        Attribute::Tag if value.chars().any(char::is_whitespace) => Some("tags cannot contain whitespace"),
        Attribute::Tag if value.chars().all(|c| c.is_ascii_digit()) => {
            Some("tags must contain a non-digit character")
        }
        Attribute::Tag if add && !inline::is_writable_tag(value) => {
            Some("added tags may only contain letters, digits, '_', '/' and '-'")
        }
        Attribute::Link if value.contains(['[', ']', '|', '\n']) => {
            Some("link targets cannot contain brackets, '|' or newlines")
        }
        Attribute::Property if value.contains([':', '\n', '\r']) || value.starts_with([' ', '\t', '-']) => {
            Some("property keys cannot contain ':' or newlines, or start with blanks or '-'")
        }
        _ => None,
    }
}

fn check_modification(modification: &Modification) -> Result<(), String> {
    let attribute = modification.attribute();
    let identifiers: Vec<String> = match modification {
        Modification::Tag { tags, .. } => tags.iter().map(|t| bare_tag(t).to_string()).collect(),
        Modification::Link { targets, .. } => targets.iter().map(|l| normalize_link(l)).collect(),
        Modification::Property { entries, .. } => {
            if let Some(entry) = entries.iter().find(|e| e.value.contains(['\n', '\r'])) {
                return Err(format!("value of property '{}' contains a newline", entry.key));
            }
            entries.iter().map(|e| e.key.trim().to_string()).collect()
        }
    };
    for identifier in &identifiers {
        if let Some(reason) = invalid_identifier(attribute, identifier, modification.is_add()) {
            return Err(format!("invalid {attribute} '{identifier}': {reason}"));
        }
    }
    Ok(())
}

/// Keep the items that pass `keep`, dropping duplicates
fn select(items: &[String], mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .iter()
        .filter(|i| seen.insert(i.as_str()) && keep(i.as_str()))
        .cloned()
        .collect()
}

/// Plan `modifications` against `snapshot`
///
/// Returns the plan and diagnostics for modifications that were skipped.
#[must_use]
pub fn plan(snapshot: &Metadata, modifications: &[Modification]) -> (Plan, Diagnostics) {
    let tags = snapshot.tag_set();
    let links = snapshot.link_set();
    let keys = snapshot.property_keys();

    let mut edits = Vec::new();
    let mut diagnostics = Diagnostics::new();

    for (index, modification) in modifications.iter().enumerate() {
        let index = index + 1;
        if let Err(reason) = check_modification(modification) {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::SkippedModification,
                format!("modification {index} skipped: {reason}"),
            ));
            continue;
        }

        let planned: Vec<Edit> = match modification {
            Modification::Tag { add, tags: wanted } => {
                let wanted: Vec<String> = wanted.iter().map(|t| normalize_tag(t)).collect();
                let selected = select(&wanted, |t| tags.contains(t) != *add);
                match (selected.is_empty(), *add) {
                    (true, _) => Vec::new(),
                    (false, true) => vec![Edit::AddTags { tags: selected }],
                    (false, false) => vec![Edit::RemoveTags { tags: selected }],
                }
            }
            Modification::Link { add, targets } => {
                let wanted: Vec<String> = targets.iter().map(|l| normalize_link(l)).collect();
                let selected = select(&wanted, |l| links.contains(l) != *add);
                match (selected.is_empty(), *add) {
                    (true, _) => Vec::new(),
                    (false, true) => vec![Edit::AddLinks { targets: selected }],
                    (false, false) => vec![Edit::RemoveLinks { targets: selected }],
                }
            }
            Modification::Property { add: true, entries } => entries
                .iter()
                .filter(|e| snapshot.property(e.key.trim()) != Some(e.value.trim()))
                .map(|PropertyEntry { key, value }| Edit::SetProperty {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                })
                .collect(),
            Modification::Property { add: false, entries } => {
                let wanted: Vec<String> = entries.iter().map(|e| e.key.trim().to_string()).collect();
                select(&wanted, |k| keys.contains(k))
                    .into_iter()
                    .map(|key| Edit::RemoveProperty { key })
                    .collect()
            }
        };

        edits.extend(planned.into_iter().map(|edit| PlannedEdit { modification: index, edit }));
    }

    let metadata = project(snapshot, &edits);
    (Plan { edits, metadata }, diagnostics)
}

/// The metadata a document will have once `edits` are applied
fn project(snapshot: &Metadata, edits: &[PlannedEdit]) -> Metadata {
    let mut metadata = snapshot.clone();
    for PlannedEdit { edit, .. } in edits {
        match edit {
            Edit::SetProperty { key, value } => {
                match metadata.frontmatter.iter_mut().rev().find(|(k, _)| k.trim() == key) {
                    Some((_, v)) => v.clone_from(value),
                    None => metadata.frontmatter.push((key.clone(), value.clone())),
                }
            }
            Edit::RemoveProperty { key } => metadata.frontmatter.retain(|(k, _)| k.trim() != key),
            Edit::AddTags { tags } => metadata.tags.extend(tags.iter().cloned()),
            Edit::RemoveTags { tags } => metadata.tags.retain(|t| !tags.contains(&normalize_tag(t))),
            Edit::AddLinks { targets } => metadata.links.extend(targets.iter().cloned()),
            Edit::RemoveLinks { targets } => {
                metadata.links.retain(|l| !targets.contains(&normalize_link(l)));
            }
        }
    }
    metadata
}
