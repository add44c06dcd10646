//! Document input and the extracted metadata view
//!
//! The host hands the engine a [`Document`]: its path, its raw text and the
//! [`Metadata`] already extracted from it. Missing collections are treated as
//! empty, never as errors.

pub mod extract;

pub use extract::extract;

use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Metadata extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Tag names, with or without the leading `#`
    #[serde(default)]
    pub tags: Vec<String>,

    /// Outgoing link targets
    #[serde(default)]
    pub links: Vec<String>,

    /// Frontmatter pairs in document order
    #[serde(default)]
    pub frontmatter: Vec<(String, String)>,
}

impl Metadata {
    /// Deduplicated, normalized tag set
    #[must_use]
    pub fn tag_set(&self) -> BTreeSet<String> {
        self.tags.iter().map(|t| normalize_tag(t)).collect()
    }

    /// Deduplicated, normalized link target set
    #[must_use]
    pub fn link_set(&self) -> BTreeSet<String> {
        self.links.iter().map(|l| normalize_link(l)).collect()
    }

    /// Deduplicated frontmatter key set
    #[must_use]
    pub fn property_keys(&self) -> BTreeSet<String> {
        self.frontmatter.iter().map(|(k, _)| k.trim().to_string()).collect()
    }

    /// Value of a frontmatter key, last occurrence wins
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.frontmatter
            .iter()
            .rev()
            .find(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A document delivered by the host for one change event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the vault root, `/` separated
    pub path: PathBuf,
    /// Raw document text
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Problems found while extracting `metadata`, carried into the outcome
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

impl Document {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            metadata,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Build a document and extract its metadata from the text itself
    #[must_use]
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let (metadata, diagnostics) = extract(&text);
        Self {
            path: path.into(),
            text,
            metadata,
            diagnostics,
        }
    }
}

/// Normalize a tag to its `#name` form
///
/// ```
/// use autometa::document::normalize_tag;
/// assert_eq!(normalize_tag("active"), "#active");
/// assert_eq!(normalize_tag(" #active "), "#active");
/// ```
#[must_use]
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim();
    let bare = tag.strip_prefix('#').unwrap_or(tag);
    format!("#{bare}")
}

/// The tag without its leading `#`
#[must_use]
pub fn bare_tag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.strip_prefix('#').unwrap_or(tag)
}

/// Normalize a link to its bare target
///
/// Strips surrounding `[[ ]]`, an alias after `|` and a heading after `#`.
///
/// ```
/// use autometa::document::normalize_link;
/// assert_eq!(normalize_link("[[Projects/Plan|the plan]]"), "Projects/Plan");
/// assert_eq!(normalize_link("Note#Heading"), "Note");
/// ```
#[must_use]
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    let inner = link
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
        .unwrap_or(link);
    let target = inner.split('|').next().unwrap_or(inner);
    let target = target.split('#').next().unwrap_or(target);
    target.trim().to_string()
}
