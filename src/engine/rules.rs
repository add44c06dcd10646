//! Rule evaluation over a document's attribute sets

use crate::actions::{Attribute, Check, Operator, Rule, RuleGroup};
use crate::document::Metadata;
use serde::Serialize;
use std::collections::BTreeSet;

/// Result of evaluating a rule group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// Per-rule results after negation, in rule order
    pub results: Vec<bool>,
    /// Combined result
    pub passed: bool,
}

/// Resolve the deduplicated attribute set a rule inspects
#[must_use]
pub fn resolve(metadata: &Metadata, attribute: Attribute) -> BTreeSet<String> {
    match attribute {
        Attribute::Tag => metadata.tag_set(),
        Attribute::Property => metadata.property_keys(),
        Attribute::Link => metadata.link_set(),
    }
}

/// Evaluate one rule
#[must_use]
pub fn evaluate_rule(metadata: &Metadata, rule: &Rule) -> bool {
    let set = resolve(metadata, rule.attribute);
    let result = match &rule.check {
        Check::Has(expected) => expected.is_subset(&set),
        Check::Equal(n) => set.len() == *n,
        Check::GreaterThan(n) => set.len() > *n,
        Check::LessThan(n) => set.len() < *n,
    };
    result != rule.negate
}

/// Evaluate a rule group
///
/// AND folds from `true` and OR folds from `false`, so an empty group passes
/// under AND and fails under OR.
#[must_use]
pub fn evaluate(metadata: &Metadata, group: &RuleGroup) -> Evaluation {
    let results: Vec<bool> = group.rules.iter().map(|r| evaluate_rule(metadata, r)).collect();
    let passed = match group.operator {
        Operator::And => results.iter().fold(true, |acc, r| acc && *r),
        Operator::Or => results.iter().fold(false, |acc, r| acc || *r),
    };
    Evaluation { results, passed }
}
