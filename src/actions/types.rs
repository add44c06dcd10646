//! Action data structures
//!
//! Two layers live here:
//! - authored definitions (`ActionDef`, `RuleGroupDef`, `RuleDef`) exactly as
//!   they appear in the registry file, and
//! - validated forms (`Action`, `RuleGroup`, `Rule`, `Check`) the engine
//!   evaluates. Converting one into the other is where configuration errors
//!   are caught.
//!
//! `Targets` and `Modification` need no separate validated form.

use crate::document::{normalize_link, normalize_tag};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::error::ActionError;

/// Which attribute dimension of a document a rule or modification touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Tag,
    Property,
    Link,
}

impl Attribute {
    /// Normalize an identifier of this attribute kind
    #[must_use]
    pub fn normalize(self, value: &str) -> String {
        match self {
            Self::Tag => normalize_tag(value),
            Self::Link => normalize_link(value),
            Self::Property => value.trim().to_string(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag => write!(f, "tag"),
            Self::Property => write!(f, "property"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// How the results of a rule group are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Every rule must pass (AND)
    #[default]
    #[serde(alias = "all")]
    And,
    /// At least one rule must pass (OR)
    #[serde(alias = "any")]
    Or,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

/// The kind of check an authored rule asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Has,
    Equal,
    GreaterThan,
    LessThan,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Has => write!(f, "has"),
            Self::Equal => write!(f, "equal"),
            Self::GreaterThan => write!(f, "greater_than"),
            Self::LessThan => write!(f, "less_than"),
        }
    }
}

/// Which documents an action considers
///
/// A `None` constraint always holds. `Some` of an empty list also holds,
/// since every element of an empty set is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    /// Folder the document must live under (matched per path component)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<String>,

    /// Tags the document must carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_tags: Option<Vec<String>>,

    /// Frontmatter keys the document must define (any value)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_property_keys: Option<Vec<String>>,
}

/// A rule as authored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub attribute: Attribute,
    pub check: CheckKind,

    #[serde(default)]
    pub negate: bool,

    /// Expected members, only for `has`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    /// Expected cardinality, only for count checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// A rule group as authored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroupDef {
    #[serde(default)]
    pub operator: Operator,

    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDef>,
}

/// One value to set or remove on a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry {
    pub key: String,
    /// Ignored when removing
    #[serde(default)]
    pub value: String,
}

impl PropertyEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An add/remove instruction for one attribute dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attribute", rename_all = "lowercase")]
pub enum Modification {
    Tag { add: bool, tags: Vec<String> },
    Link { add: bool, targets: Vec<String> },
    Property { add: bool, entries: Vec<PropertyEntry> },
}

impl Modification {
    #[must_use]
    pub const fn attribute(&self) -> Attribute {
        match self {
            Self::Tag { .. } => Attribute::Tag,
            Self::Link { .. } => Attribute::Link,
            Self::Property { .. } => Attribute::Property,
        }
    }

    #[must_use]
    pub const fn is_add(&self) -> bool {
        match self {
            Self::Tag { add, .. } | Self::Link { add, .. } | Self::Property { add, .. } => *add,
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::Tag { add, tags } => Self::Tag {
                add,
                tags: tags.iter().map(|t| normalize_tag(t)).collect(),
            },
            Self::Link { add, targets } => Self::Link {
                add,
                targets: targets.iter().map(|t| normalize_link(t)).collect(),
            },
            Self::Property { add, entries } => Self::Property {
                add,
                entries: entries
                    .into_iter()
                    .map(|e| PropertyEntry::new(e.key.trim(), e.value.trim()))
                    .collect(),
            },
        }
    }

    fn has_empty_identifier(&self) -> bool {
        match self {
            Self::Tag { tags, .. } => tags.iter().any(|t| t.trim().trim_start_matches('#').is_empty()),
            Self::Link { targets, .. } => targets.iter().any(|t| normalize_link(t).is_empty()),
            Self::Property { entries, .. } => entries.iter().any(|e| e.key.trim().is_empty()),
        }
    }
}

/// An action as authored in the registry file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,

    #[serde(default)]
    pub targets: Targets,

    #[serde(default)]
    pub rules: RuleGroupDef,

    #[serde(default)]
    pub modifications: Vec<Modification>,
}

/// A validated check with exactly the data it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Every expected value is present
    Has(BTreeSet<String>),
    Equal(usize),
    GreaterThan(usize),
    LessThan(usize),
}

/// A validated rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub attribute: Attribute,
    pub check: Check,
    pub negate: bool,
}

impl Rule {
    /// A `has` rule over `values`
    pub fn has<I, S>(attribute: Attribute, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            attribute,
            check: Check::Has(values.into_iter().map(|v| attribute.normalize(v.as_ref())).collect()),
            negate: false,
        }
    }

    /// A cardinality rule
    #[must_use]
    pub const fn count(attribute: Attribute, check: CountCheck, count: usize) -> Self {
        let check = match check {
            CountCheck::Equal => Check::Equal(count),
            CountCheck::GreaterThan => Check::GreaterThan(count),
            CountCheck::LessThan => Check::LessThan(count),
        };
        Self {
            attribute,
            check,
            negate: false,
        }
    }

    /// The same rule with its result flipped
    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    fn from_def(def: RuleDef, action: &str, index: usize) -> Result<Self, ActionError> {
        let check = match (def.check, def.values, def.count) {
            (CheckKind::Has, _, Some(_)) => {
                return Err(ActionError::UnexpectedCount {
                    action: action.to_string(),
                    rule: index,
                });
            }
            (CheckKind::Has, values, None) => Check::Has(
                values
                    .unwrap_or_default()
                    .iter()
                    .map(|v| def.attribute.normalize(v))
                    .collect(),
            ),
            (check, Some(_), _) => {
                return Err(ActionError::UnexpectedValues {
                    action: action.to_string(),
                    rule: index,
                    check,
                });
            }
            (check, None, None) => {
                return Err(ActionError::MissingCount {
                    action: action.to_string(),
                    rule: index,
                    check,
                });
            }
            (CheckKind::Equal, None, Some(n)) => Check::Equal(n),
            (CheckKind::GreaterThan, None, Some(n)) => Check::GreaterThan(n),
            (CheckKind::LessThan, None, Some(n)) => Check::LessThan(n),
        };
        Ok(Self {
            attribute: def.attribute,
            check,
            negate: def.negate,
        })
    }
}

/// Cardinality comparisons, used to build count rules in code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCheck {
    Equal,
    GreaterThan,
    LessThan,
}

/// A validated rule group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleGroup {
    pub operator: Operator,
    pub rules: Vec<Rule>,
}

impl RuleGroup {
    #[must_use]
    pub const fn new(operator: Operator, rules: Vec<Rule>) -> Self {
        Self { operator, rules }
    }
}

/// A validated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub targets: Targets,
    pub rules: RuleGroup,
    pub modifications: Vec<Modification>,
}

impl TryFrom<ActionDef> for Action {
    type Error = ActionError;

    fn try_from(def: ActionDef) -> Result<Self, Self::Error> {
        let name = def.name.trim().to_string();
        if name.is_empty() {
            return Err(ActionError::EmptyName);
        }

        let rules = def
            .rules
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, r)| Rule::from_def(r, &name, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((i, m)) = def
            .modifications
            .iter()
            .enumerate()
            .find(|(_, m)| m.has_empty_identifier())
        {
            return Err(ActionError::EmptyIdentifier {
                action: name,
                modification: i + 1,
                attribute: m.attribute(),
            });
        }

        Ok(Self {
            name,
            targets: def.targets,
            rules: RuleGroup::new(def.rules.operator, rules),
            modifications: def.modifications.into_iter().map(Modification::normalized).collect(),
        })
    }
}
