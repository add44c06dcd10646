//! Metadata extraction from raw document text
//!
//! Used when no host-provided metadata is available, e.g. when running over
//! files on disk. Tags come from inline `#tag` tokens and from the `tags`
//! frontmatter list; links from inline `[[target]]` tokens; properties from
//! the frontmatter block.

use super::{Metadata, normalize_tag};
use crate::diagnostics::Diagnostics;
use crate::frontmatter::{Frontmatter, TAGS_KEY};
use crate::inline;

/// Extract tags, links and frontmatter pairs from `text`
///
/// A malformed block yields whatever pairs could be read, along with the
/// warnings describing what was tolerated.
#[must_use]
pub fn extract(text: &str) -> (Metadata, Diagnostics) {
    let (frontmatter, diagnostics) = Frontmatter::parse(text);

    let mut tags: Vec<String> = frontmatter
        .list_items(TAGS_KEY)
        .iter()
        .map(|t| normalize_tag(t))
        .collect();
    tags.extend(inline::tags(text));

    let metadata = Metadata {
        tags,
        links: inline::links(text),
        frontmatter: frontmatter.pairs(),
    };
    (metadata, diagnostics)
}
