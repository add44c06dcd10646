//! The evaluate-and-mutate entry point
//!
//! For each action in registry order the engine:
//!
//! 1. matches the action's targets against the document ([`targets`])
//! 2. evaluates its rule group ([`rules`])
//! 3. plans its modifications against a frozen metadata snapshot ([`planner`])
//! 4. applies the plan to the current text ([`apply`])
//!
//! Actions see the metadata left by earlier actions in the same pass. The
//! engine does no I/O: it returns either [`Change::Unchanged`] or the full
//! replacement text.
//!
//! # Examples
//!
//! ```
//! use autometa::actions::ActionRegistry;
//! use autometa::document::Document;
//! use autometa::engine::Engine;
//!
//! let registry = ActionRegistry::from_toml_str(r#"
//! [[action]]
//! name = "done"
//!
//! [[action.modifications]]
//! attribute = "property"
//! add = true
//! entries = [{ key = "status", value = "done" }]
//! "#).unwrap();
//!
//! let document = Document::from_text("note.md", "Body\n");
//! let outcome = Engine::default().evaluate_and_mutate(&registry, &document);
//! assert_eq!(outcome.text(), Some("---\nstatus: done\n---\nBody\n"));
//! ```

pub mod apply;
pub mod planner;
pub mod rules;
pub mod targets;

use crate::actions::{Action, ActionRegistry};
use crate::diagnostics::Diagnostics;
use crate::document::{Document, Metadata};
use planner::PlannedEdit;
use rules::Evaluation;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Where added tags are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TagStyle {
    /// `#tag` tokens on a new body line
    #[default]
    Inline,
    /// Items of the `tags` frontmatter list
    Frontmatter,
}

impl fmt::Display for TagStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Frontmatter => write!(f, "frontmatter"),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub tag_style: TagStyle,
}

/// Result text of one evaluation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Unchanged,
    Rewritten(String),
}

/// An action whose rules passed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub name: String,
    pub evaluation: Evaluation,
    pub edits: Vec<PlannedEdit>,
    /// Whether the text changed because of this action
    pub changed: bool,
}

/// Why an action did not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    OutOfScope,
    RulesFailed { results: Vec<bool> },
}

/// An action that did not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedAction {
    pub name: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Everything one evaluation pass produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub change: Change,
    pub applied: Vec<ActionReport>,
    pub skipped: Vec<SkippedAction>,
    pub diagnostics: Diagnostics,
    /// Metadata after every applied action
    #[serde(skip)]
    pub metadata: Metadata,
}

impl Outcome {
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self.change, Change::Rewritten(_))
    }

    /// Replacement text, if the document changed
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.change {
            Change::Unchanged => None,
            Change::Rewritten(text) => Some(text),
        }
    }

    /// Names of actions that changed the document
    #[must_use]
    pub fn changed_by(&self) -> Vec<&str> {
        self.applied
            .iter()
            .filter(|r| r.changed)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Evaluates actions against documents
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    #[must_use]
    pub const fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Run every action in `registry` against `document`
    ///
    /// Never fails: problems are recorded in [`Outcome::diagnostics`] and the
    /// affected action or modification is skipped. The outcome starts with the
    /// diagnostics found while extracting the document's metadata.
    #[must_use]
    pub fn evaluate_and_mutate(&self, registry: &ActionRegistry, document: &Document) -> Outcome {
        let mut text = document.text.clone();
        let mut metadata = document.metadata.clone();
        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut diagnostics = document.diagnostics.clone();

        for action in registry {
            match self.run_action(action, document, &text, &metadata) {
                Step::Skipped(reason) => skipped.push(SkippedAction {
                    name: action.name.clone(),
                    reason,
                }),
                Step::Ran {
                    report,
                    text: new_text,
                    metadata: new_metadata,
                    diagnostics: action_diagnostics,
                } => {
                    diagnostics.absorb(action_diagnostics, &action.name);
                    if report.changed {
                        text = new_text;
                    }
                    metadata = new_metadata;
                    applied.push(report);
                }
            }
        }

        let change = if text == document.text {
            Change::Unchanged
        } else {
            Change::Rewritten(text)
        };

        Outcome {
            change,
            applied,
            skipped,
            diagnostics,
            metadata,
        }
    }

    fn run_action(&self, action: &Action, document: &Document, text: &str, metadata: &Metadata) -> Step {
        if !targets::matches_parts(&document.path, metadata, &action.targets) {
            debug!(action = %action.name, path = %document.path.display(), "out of scope");
            return Step::Skipped(SkipReason::OutOfScope);
        }

        let evaluation = rules::evaluate(metadata, &action.rules);
        debug!(
            action = %action.name,
            results = ?evaluation.results,
            passed = evaluation.passed,
            "rules evaluated"
        );
        if !evaluation.passed {
            return Step::Skipped(SkipReason::RulesFailed {
                results: evaluation.results,
            });
        }

        let (plan, diagnostics) = planner::plan(metadata, &action.modifications);
        let applied = apply::apply(text, &plan, self.options.tag_style);

        if applied.changed {
            info!(
                action = %action.name,
                path = %document.path.display(),
                edits = plan.edits.len(),
                "applied"
            );
        }

        Step::Ran {
            report: ActionReport {
                name: action.name.clone(),
                evaluation,
                edits: plan.edits,
                changed: applied.changed,
            },
            text: applied.text,
            metadata: plan.metadata,
            diagnostics,
        }
    }
}

enum Step {
    Skipped(SkipReason),
    Ran {
        report: ActionReport,
        text: String,
        metadata: Metadata,
        diagnostics: Diagnostics,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{
        ActionDef, Attribute, CheckKind, Modification, PropertyEntry, RuleDef, RuleGroupDef, Targets,
    };
    use crate::diagnostics::DiagnosticKind;
    use crate::testing::{action, registry};

    fn run(registry: &ActionRegistry, path: &str, text: &str) -> Outcome {
        Engine::default().evaluate_and_mutate(registry, &Document::from_text(path, text))
    }

    #[test]
    fn test_property_added_to_document_without_block() {
        let registry = registry(vec![action(
            "done",
            Targets::default(),
            RuleGroupDef::default(),
            vec![Modification::Property { add: true, entries: vec![PropertyEntry::new("status", "done")] }],
        )]);
        let outcome = run(&registry, "x.md", "Body\n");
        assert_eq!(outcome.text(), Some("---\nstatus: done\n---\nBody\n"));
        assert_eq!(outcome.changed_by(), vec!["done"]);
    }

    #[test]
    fn test_out_of_scope_and_failed_rules_are_skipped() {
        let registry = registry(vec![
            action(
                "projects-only",
                Targets { parent_folder: Some("projects".into()), ..Targets::default() },
                RuleGroupDef::default(),
                vec![Modification::Tag { add: true, tags: vec!["#p".into()] }],
            ),
            action(
                "needs-tag",
                Targets::default(),
                RuleGroupDef {
                    rules: vec![RuleDef {
                        attribute: Attribute::Tag,
                        check: CheckKind::Has,
                        negate: false,
                        values: Some(vec!["#missing".into()]),
                        count: None,
                    }],
                    ..RuleGroupDef::default()
                },
                vec![Modification::Tag { add: true, tags: vec!["#q".into()] }],
            ),
        ]);
        let outcome = run(&registry, "notes/x.md", "Body\n");
        assert_eq!(outcome.change, Change::Unchanged);
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].reason, SkipReason::OutOfScope);
        assert_eq!(outcome.skipped[1].reason, SkipReason::RulesFailed { results: vec![false] });
    }

    #[test]
    fn test_later_actions_see_earlier_changes() {
        let registry = registry(vec![
            action(
                "tag-it",
                Targets::default(),
                RuleGroupDef::default(),
                vec![Modification::Tag { add: true, tags: vec!["#review".into()] }],
            ),
            action(
                "mark-review",
                Targets { required_tags: Some(vec!["#review".into()]), ..Targets::default() },
                RuleGroupDef::default(),
                vec![Modification::Property { add: true, entries: vec![PropertyEntry::new("stage", "review")] }],
            ),
        ]);
        let outcome = run(&registry, "x.md", "Body\n");
        assert_eq!(outcome.text(), Some("---\nstage: review\n---\nBody\n#review\n"));
        assert_eq!(outcome.changed_by(), vec!["tag-it", "mark-review"]);
        assert!(outcome.metadata.tag_set().contains("#review"));
    }

    #[test]
    fn test_rerun_on_output_is_fixed_point() {
        let registry = registry(vec![action(
            "archive",
            Targets::default(),
            RuleGroupDef {
                rules: vec![RuleDef {
                    attribute: Attribute::Tag,
                    check: CheckKind::Has,
                    negate: false,
                    values: Some(vec!["#done".into()]),
                    count: None,
                }],
                ..RuleGroupDef::default()
            },
            vec![
                Modification::Property { add: true, entries: vec![PropertyEntry::new("archived", "true")] },
                Modification::Tag { add: false, tags: vec!["#todo".into()] },
                Modification::Tag { add: true, tags: vec!["#archive".into()] },
                Modification::Link { add: true, targets: vec!["Archive".into()] },
            ],
        )]);

        let first = run(&registry, "x.md", "Task #done #todo\n");
        let text = first.text().unwrap().to_string();
        assert_eq!(text, "---\narchived: true\n---\nTask #done\n#archive\n[[Archive]]\n");

        let second = run(&registry, "x.md", &text);
        assert_eq!(second.change, Change::Unchanged);
        assert!(second.applied[0].edits.is_empty());
    }

    #[test]
    fn test_disabled_action_does_not_stop_others() {
        let broken = ActionDef {
            name: "broken".into(),
            targets: Targets::default(),
            rules: RuleGroupDef {
                rules: vec![RuleDef {
                    attribute: Attribute::Tag,
                    check: CheckKind::GreaterThan,
                    negate: false,
                    values: Some(vec!["#x".into()]),
                    count: None,
                }],
                ..RuleGroupDef::default()
            },
            modifications: vec![Modification::Tag { add: true, tags: vec!["#never".into()] }],
        };
        let ok = action(
            "ok",
            Targets::default(),
            RuleGroupDef::default(),
            vec![Modification::Tag { add: true, tags: vec!["#ok".into()] }],
        );
        let registry = registry(vec![broken, ok]);
        assert_eq!(registry.disabled().len(), 1);

        let outcome = run(&registry, "x.md", "Body\n");
        assert_eq!(outcome.text(), Some("Body\n#ok\n"));
    }

    #[test]
    fn test_skipped_modification_is_reported_with_action_name() {
        let registry = registry(vec![action(
            "mixed",
            Targets::default(),
            RuleGroupDef::default(),
            vec![
                Modification::Tag { add: true, tags: vec!["#bad tag".into()] },
                Modification::Tag { add: true, tags: vec!["#good".into()] },
            ],
        )]);
        let outcome = run(&registry, "x.md", "Body\n");
        assert_eq!(outcome.text(), Some("Body\n#good\n"));
        assert_eq!(outcome.diagnostics.len(), 1);
        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::SkippedModification);
        assert_eq!(diagnostic.action.as_deref(), Some("mixed"));
    }

    #[test]
    fn test_unwritable_tag_is_skipped_and_rerun_is_stable() {
        let registry = registry(vec![action(
            "lang",
            Targets::default(),
            RuleGroupDef::default(),
            vec![
                Modification::Tag { add: true, tags: vec!["#c++".into()] },
                Modification::Tag { add: true, tags: vec!["#cpp".into()] },
            ],
        )]);
        let first = run(&registry, "x.md", "Body\n");
        assert_eq!(first.text(), Some("Body\n#cpp\n"));
        assert_eq!(first.diagnostics.len(), 1);

        let second = run(&registry, "x.md", first.text().unwrap());
        assert_eq!(second.change, Change::Unchanged);
    }

    #[test]
    fn test_tag_after_open_code_block_is_added_once() {
        let registry = registry(vec![action(
            "tag",
            Targets::default(),
            RuleGroupDef::default(),
            vec![
                Modification::Tag { add: true, tags: vec!["#x".into()] },
                Modification::Link { add: true, targets: vec!["Home".into()] },
            ],
        )]);
        let first = run(&registry, "x.md", "text\n```\ncode\n");
        let text = first.text().unwrap().to_string();
        assert_eq!(text, "text\n```\ncode\n```\n#x\n[[Home]]\n");

        let second = run(&registry, "x.md", &text);
        assert_eq!(second.change, Change::Unchanged);
    }

    #[test]
    fn test_extraction_warnings_are_reported_once() {
        let registry = registry(vec![
            action(
                "tag",
                Targets::default(),
                RuleGroupDef::default(),
                vec![Modification::Tag { add: true, tags: vec!["#x".into()] }],
            ),
            action(
                "status",
                Targets::default(),
                RuleGroupDef::default(),
                vec![Modification::Property { add: true, entries: vec![PropertyEntry::new("status", "new")] }],
            ),
        ]);
        let outcome = run(&registry, "x.md", "---\na: 1\njunk\n---\nBody\n");
        assert_eq!(outcome.text(), Some("---\na: 1\njunk\nstatus: new\n---\nBody\n#x\n"));
        assert_eq!(outcome.diagnostics.len(), 1);
        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::MalformedLine);
        assert!(diagnostic.action.is_none());
    }

    #[test]
    fn test_frontmatter_tag_style_option() {
        let registry = registry(vec![action(
            "tag",
            Targets::default(),
            RuleGroupDef::default(),
            vec![Modification::Tag { add: true, tags: vec!["#x".into(), "#y".into()] }],
        )]);
        let engine = Engine::new(EngineOptions { tag_style: TagStyle::Frontmatter });
        let outcome = engine.evaluate_and_mutate(&registry, &Document::from_text("a.md", "Body\n"));
        assert_eq!(outcome.text(), Some("---\ntags: [x, y]\n---\nBody\n"));
    }

    #[test]
    fn test_empty_registry_is_unchanged() {
        let outcome = run(&ActionRegistry::new(), "x.md", "anything");
        assert!(!outcome.is_changed());
        assert!(outcome.applied.is_empty());
    }
}
