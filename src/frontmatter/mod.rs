//! Minimal line-based frontmatter model
//!
//! Frontmatter is the block between a `---` fence on the first line of a
//! document and the next `---` line. It is modelled as ordered `key: value`
//! pairs, not as YAML. Lines are split on their first `:`. Indented lines and
//! `- item` lines that follow a pair belong to that pair as continuation
//! lines, so block lists survive a rewrite untouched.
//!
//! Rewriting only touches the text between the two fences. Everything else
//! in the document stays byte-identical.
//!
//! # Examples
//!
//! ```
//! use autometa::frontmatter::Frontmatter;
//!
//! let text = "---\na: 1\nb: 2\n---\nbody\n";
//! let (mut fm, _) = Frontmatter::parse(text);
//! fm.upsert("c", "3");
//! fm.remove("b");
//! assert_eq!(fm.splice_into(text), "---\na: 1\nc: 3\n---\nbody\n");
//! ```

pub mod list;

pub use list::ListStyle;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};

/// The fence line that opens and closes a frontmatter block
pub const FENCE: &str = "---";

/// Key whose list items are the document's frontmatter tags
pub const TAGS_KEY: &str = "tags";

/// Location of a frontmatter block inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Byte offset of the first line after the opening fence
    pub start: usize,
    /// Byte offset of the closing fence line
    pub end: usize,
    /// Byte offset of the first byte after the closing fence line
    pub body_start: usize,
    /// Line ending used by the opening fence
    pub line_ending: &'static str,
}

/// Result of looking for a frontmatter block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Block(Block),
    /// The document does not start with a fence
    Missing,
    /// The document starts with a fence that is never closed
    Unterminated,
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

fn line_ending_of(line: &str) -> &'static str {
    if line.ends_with("\r\n") { "\r\n" } else { "\n" }
}

/// Find the frontmatter block at the top of `text`
#[must_use]
pub fn locate(text: &str) -> Located {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Located::Missing;
    };
    if !is_fence(first) || !first.ends_with('\n') {
        return if is_fence(first) { Located::Unterminated } else { Located::Missing };
    }

    let start = first.len();
    let mut offset = start;
    for line in lines {
        if is_fence(line) {
            return Located::Block(Block {
                start,
                end: offset,
                body_start: offset + line.len(),
                line_ending: line_ending_of(first),
            });
        }
        offset += line.len();
    }
    Located::Unterminated
}

/// Byte offset where the body (text after any frontmatter block) begins
#[must_use]
pub fn body_start(text: &str) -> usize {
    match locate(text) {
        Located::Block(block) => block.body_start,
        Located::Missing | Located::Unterminated => 0,
    }
}

/// Line ending to use when synthesizing text for `text`
#[must_use]
pub fn preferred_line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// One line (or group of lines) inside the block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Pair {
        key: String,
        value: String,
        continuation: Vec<String>,
    },
    /// A line kept verbatim: blank lines and lines without a `:`
    Raw(String),
}

/// Parsed frontmatter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    items: Vec<Item>,
    block: Option<Block>,
    line_ending: &'static str,
    dirty: bool,
}

impl Frontmatter {
    /// An empty frontmatter with no block in the source document
    #[must_use]
    pub const fn empty(line_ending: &'static str) -> Self {
        Self {
            items: Vec::new(),
            block: None,
            line_ending,
            dirty: false,
        }
    }

    /// Parse the frontmatter block of `text`
    ///
    /// A document with no block, or with an unterminated one, yields an empty
    /// frontmatter that will be synthesized as a new block when written.
    #[must_use]
    pub fn parse(text: &str) -> (Self, Diagnostics) {
        let mut found = Vec::new();
        let frontmatter = Self::parse_into(text, &mut found);
        let mut diagnostics = Diagnostics::new();
        for diagnostic in found {
            diagnostics.push(diagnostic);
        }
        (frontmatter, diagnostics)
    }

    /// Parse without reporting problems
    ///
    /// For re-reading text whose diagnostics were already recorded.
    #[must_use]
    pub fn read(text: &str) -> Self {
        Self::parse_into(text, &mut Vec::new())
    }

    fn parse_into(text: &str, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let block = match locate(text) {
            Located::Block(block) => block,
            Located::Missing => return Self::empty(preferred_line_ending(text)),
            Located::Unterminated => {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::UnterminatedFrontmatter,
                    "frontmatter opening fence has no closing fence",
                ));
                return Self::empty(preferred_line_ending(text));
            }
        };

        let mut items: Vec<Item> = Vec::new();
        for raw in text[block.start..block.end].lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let is_continuation = line.starts_with([' ', '\t']) || line.starts_with("- ") || line == "-";

            if line.trim().is_empty() {
                items.push(Item::Raw(line.to_string()));
                continue;
            }

            if is_continuation {
                match items.last_mut() {
                    Some(Item::Pair { continuation, .. }) => continuation.push(line.to_string()),
                    _ => items.push(Item::Raw(line.to_string())),
                }
                continue;
            }

            match line.split_once(':') {
                Some((key, value)) => items.push(Item::Pair {
                    key: key.trim().to_string(),
                    value: value.trim().to_string(),
                    continuation: Vec::new(),
                }),
                None => {
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::MalformedLine,
                        format!("frontmatter line without ':' ignored: '{line}'"),
                    ));
                    items.push(Item::Raw(line.to_string()));
                }
            }
        }

        let items = collapse_duplicates(items, diagnostics);
        Self {
            items,
            block: Some(block),
            line_ending: block.line_ending,
            dirty: false,
        }
    }

    /// Whether the source document had a frontmatter block
    #[must_use]
    pub const fn has_block(&self) -> bool {
        self.block.is_some()
    }

    /// Whether any edit changed the frontmatter since parsing
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pair(key).map(|(value, _)| value)
    }

    /// Keys in document order
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|i| match i {
                Item::Pair { key, .. } => Some(key.as_str()),
                Item::Raw(_) => None,
            })
            .collect()
    }

    /// `(key, value)` pairs in document order
    #[must_use]
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.items
            .iter()
            .filter_map(|i| match i {
                Item::Pair { key, value, .. } => Some((key.clone(), value.clone())),
                Item::Raw(_) => None,
            })
            .collect()
    }

    /// Set `key` to `value`, appending the pair if the key is new
    ///
    /// Replacing a value drops the key's continuation lines. Returns whether
    /// anything changed.
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        if let Some(Item::Pair { value: current, continuation, .. }) = self.pair_mut(key) {
            if current == value && continuation.is_empty() {
                return false;
            }
            *current = value.to_string();
            continuation.clear();
        } else {
            self.items.push(Item::Pair {
                key: key.to_string(),
                value: value.to_string(),
                continuation: Vec::new(),
            });
        }
        self.dirty = true;
        true
    }

    /// Remove `key` and its continuation lines; returns whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|i| !matches!(i, Item::Pair { key: k, .. } if k == key));
        let removed = self.items.len() != before;
        self.dirty |= removed;
        removed
    }

    /// Render the lines between the fences
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Pair { key, value, continuation } => {
                    out.push_str(key);
                    out.push(':');
                    if !value.is_empty() {
                        out.push(' ');
                        out.push_str(value);
                    }
                    out.push_str(self.line_ending);
                    for line in continuation {
                        out.push_str(line);
                        out.push_str(self.line_ending);
                    }
                }
                Item::Raw(line) => {
                    out.push_str(line);
                    out.push_str(self.line_ending);
                }
            }
        }
        out
    }

    /// Write this frontmatter back into `text`
    ///
    /// `text` must be the document this frontmatter was parsed from (or one
    /// whose frontmatter block sits at the same offsets). Unchanged
    /// frontmatter returns `text` as is. Without a source block a new one is
    /// synthesized at the top of the document.
    #[must_use]
    pub fn splice_into(&self, text: &str) -> String {
        if !self.dirty {
            return text.to_string();
        }
        match self.block {
            Some(block) => {
                let mut out = String::with_capacity(text.len() + 64);
                out.push_str(&text[..block.start]);
                out.push_str(&self.render());
                out.push_str(&text[block.end..]);
                out
            }
            None => {
                let mut out = String::with_capacity(text.len() + 64);
                out.push_str(FENCE);
                out.push_str(self.line_ending);
                out.push_str(&self.render());
                out.push_str(FENCE);
                out.push_str(self.line_ending);
                out.push_str(text);
                out
            }
        }
    }

    fn pair(&self, key: &str) -> Option<(&str, &[String])> {
        self.items.iter().find_map(|i| match i {
            Item::Pair { key: k, value, continuation } if k == key => {
                Some((value.as_str(), continuation.as_slice()))
            }
            _ => None,
        })
    }

    fn pair_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| matches!(i, Item::Pair { key: k, .. } if k == key))
    }
}

/// Collapse repeated keys: the first position keeps the last value
fn collapse_duplicates(items: Vec<Item>, diagnostics: &mut Vec<Diagnostic>) -> Vec<Item> {
    let mut out: Vec<Item> = Vec::with_capacity(items.len());
    for item in items {
        if let Item::Pair { key, value, continuation } = &item {
            let existing = out
                .iter_mut()
                .find(|i| matches!(i, Item::Pair { key: k, .. } if k == key));
            if let Some(Item::Pair { value: v, continuation: c, .. }) = existing {
                diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::DuplicateKey,
                    format!("duplicate frontmatter key '{key}', keeping the last value"),
                ));
                v.clone_from(value);
                c.clone_from(continuation);
                continue;
            }
        }
        out.push(item);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_block() {
        let text = "---\na: 1\n---\nbody";
        let Located::Block(block) = locate(text) else {
            panic!("expected a block");
        };
        assert_eq!(&text[block.start..block.end], "a: 1\n");
        assert_eq!(&text[block.body_start..], "body");
    }

    #[test]
    fn test_locate_missing_and_unterminated() {
        assert_eq!(locate("no fence\n---\n"), Located::Missing);
        assert_eq!(locate(""), Located::Missing);
        assert_eq!(locate("---\na: 1\n"), Located::Unterminated);
        assert_eq!(locate("---"), Located::Unterminated);
    }

    #[test]
    fn test_fence_must_be_first_line() {
        assert_eq!(locate("\n---\na: 1\n---\n"), Located::Missing);
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let (fm, diagnostics) = Frontmatter::parse("---\nurl: https://example.com\n---\n");
        assert_eq!(fm.get("url"), Some("https://example.com"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_parse_warns_on_line_without_colon() {
        let text = "---\na: 1\njunk\n---\n";
        let (fm, diagnostics) = Frontmatter::parse(text);
        assert_eq!(fm.keys(), vec!["a"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.iter().next().unwrap().kind, DiagnosticKind::MalformedLine);
        assert_eq!(Frontmatter::read(text), fm);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let (fm, diagnostics) = Frontmatter::parse("---\na: 1\nb: 2\na: 3\n---\n");
        assert_eq!(fm.pairs(), vec![("a".into(), "3".into()), ("b".into(), "2".into())]);
        assert_eq!(diagnostics.iter().next().unwrap().kind, DiagnosticKind::DuplicateKey);
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let text = "---\na: 1\nb: 2\n---\n# Title\n\nbody text\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(fm.upsert("c", "3"));
        let added = fm.splice_into(text);
        assert_eq!(added, "---\na: 1\nb: 2\nc: 3\n---\n# Title\n\nbody text\n");

        let (mut fm, _) = Frontmatter::parse(&added);
        assert!(fm.remove("b"));
        assert_eq!(fm.splice_into(&added), "---\na: 1\nc: 3\n---\n# Title\n\nbody text\n");
    }

    #[test]
    fn test_upsert_same_value_is_noop() {
        let text = "---\nstatus: done\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(!fm.upsert("status", "done"));
        assert!(!fm.is_dirty());
        assert_eq!(fm.splice_into(text), text);
    }

    #[test]
    fn test_synthesize_block() {
        let text = "just a body\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(!fm.has_block());
        fm.upsert("status", "done");
        assert_eq!(fm.splice_into(text), "---\nstatus: done\n---\njust a body\n");
    }

    #[test]
    fn test_continuation_lines_survive_rewrite() {
        let text = "---\ntags:\n  - a\n  - b\ntitle: x\n---\nbody\n";
        let (mut fm, _) = Frontmatter::parse(text);
        fm.upsert("title", "y");
        assert_eq!(fm.splice_into(text), "---\ntags:\n  - a\n  - b\ntitle: y\n---\nbody\n");
    }

    #[test]
    fn test_crlf_preserved() {
        let text = "---\r\na: 1\r\n---\r\nbody\r\n";
        let (mut fm, _) = Frontmatter::parse(text);
        fm.upsert("b", "2");
        assert_eq!(fm.splice_into(text), "---\r\na: 1\r\nb: 2\r\n---\r\nbody\r\n");
    }

    #[test]
    fn test_empty_value_renders_without_trailing_space() {
        let text = "---\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        fm.upsert("draft", "");
        assert_eq!(fm.splice_into(text), "---\ndraft:\n---\n");
    }
}
