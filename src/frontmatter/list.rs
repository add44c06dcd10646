//! List-valued frontmatter keys such as `tags`
//!
//! Three spellings are understood and preserved on rewrite:
//!
//! ```text
//! tags: [a, b]        # flow
//! tags: a, b          # plain
//! tags:               # block
//!   - a
//!   - b
//! ```

use super::{Frontmatter, Item};

/// How a list value is spelled in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    Flow,
    Plain,
    Block,
}

const DEFAULT_BLOCK_PREFIX: &str = "  - ";

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn block_item(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix('-').map(str::trim)
}

fn block_prefix(line: &str) -> String {
    let indent = line.len() - line.trim_start().len();
    let rest = &line[indent..];
    let dash_and_space = rest
        .strip_prefix('-')
        .map_or(0, |r| 1 + (r.len() - r.trim_start().len()));
    line[..indent + dash_and_space].to_string()
}

/// Split a single-line value into its raw tokens
fn inline_tokens(value: &str) -> (ListStyle, Vec<String>, &'static str) {
    let trimmed = value.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let tokens = inner
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        return (ListStyle::Flow, tokens, ", ");
    }
    if trimmed.contains(',') {
        let tokens = trimmed
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        (ListStyle::Plain, tokens, ", ")
    } else {
        let tokens = trimmed.split_whitespace().map(str::to_string).collect();
        (ListStyle::Plain, tokens, " ")
    }
}

fn render_inline(style: ListStyle, tokens: &[String], separator: &str) -> String {
    let joined = tokens.join(separator);
    match style {
        ListStyle::Flow => format!("[{joined}]"),
        ListStyle::Plain | ListStyle::Block => joined,
    }
}

impl Frontmatter {
    /// Items of a list-valued key, unquoted, in document order
    #[must_use]
    pub fn list_items(&self, key: &str) -> Vec<String> {
        let Some((value, continuation)) = self.pair(key) else {
            return Vec::new();
        };
        if value.is_empty() {
            continuation
                .iter()
                .filter_map(|l| block_item(l))
                .map(|i| unquote(i).to_string())
                .filter(|i| !i.is_empty())
                .collect()
        } else {
            let (_, tokens, _) = inline_tokens(value);
            tokens.iter().map(|t| unquote(t).to_string()).collect()
        }
    }

    /// Spelling of a list-valued key, if the key is present
    #[must_use]
    pub fn list_style(&self, key: &str) -> Option<ListStyle> {
        let (value, continuation) = self.pair(key)?;
        Some(if value.is_empty() && !continuation.is_empty() {
            ListStyle::Block
        } else if value.is_empty() {
            ListStyle::Flow
        } else {
            inline_tokens(value).0
        })
    }

    /// Append `new_items` missing from the list under `key`
    ///
    /// `same` decides whether two items are the same entry. A missing key is
    /// created as a flow list. Returns whether anything changed.
    pub fn add_list_items<F>(&mut self, key: &str, new_items: &[String], same: F) -> bool
    where
        F: Fn(&str, &str) -> bool,
    {
        let existing = self.list_items(key);
        let mut missing: Vec<&String> = Vec::new();
        for item in new_items {
            let present = existing.iter().any(|e| same(e.as_str(), item.as_str()))
                || missing.iter().any(|m| same(m.as_str(), item.as_str()));
            if !present {
                missing.push(item);
            }
        }
        if missing.is_empty() {
            return false;
        }

        match self.list_style(key) {
            None => {
                let tokens: Vec<String> = missing.into_iter().cloned().collect();
                self.upsert(key, &render_inline(ListStyle::Flow, &tokens, ", "));
            }
            Some(ListStyle::Block) => {
                let Some(Item::Pair { continuation, .. }) = self.pair_mut(key) else {
                    return false;
                };
                let prefix = continuation
                    .iter()
                    .find(|l| block_item(l).is_some())
                    .map_or_else(|| DEFAULT_BLOCK_PREFIX.to_string(), |l| block_prefix(l));
                for item in missing {
                    continuation.push(format!("{prefix}{item}"));
                }
                self.dirty = true;
            }
            Some(ListStyle::Flow | ListStyle::Plain) => {
                let Some(Item::Pair { value, .. }) = self.pair_mut(key) else {
                    return false;
                };
                let (style, mut tokens, separator) = if value.is_empty() {
                    (ListStyle::Flow, Vec::new(), ", ")
                } else {
                    inline_tokens(value)
                };
                tokens.extend(missing.into_iter().cloned());
                *value = render_inline(style, &tokens, separator);
                self.dirty = true;
            }
        }
        true
    }

    /// Remove every item matching one of `targets` from the list under `key`
    ///
    /// Returns whether anything changed.
    pub fn remove_list_items<F>(&mut self, key: &str, targets: &[String], same: F) -> bool
    where
        F: Fn(&str, &str) -> bool,
    {
        let matches_target = |item: &str| targets.iter().any(|t| same(unquote(item), t.as_str()));
        let Some(Item::Pair { value, continuation, .. }) = self.pair_mut(key) else {
            return false;
        };

        let changed = if value.is_empty() {
            let before = continuation.len();
            continuation.retain(|l| block_item(l).is_none_or(|i| !matches_target(i)));
            continuation.len() != before
        } else {
            let (style, tokens, separator) = inline_tokens(value);
            let kept: Vec<String> = tokens
                .iter()
                .filter(|t| !matches_target(t.as_str()))
                .cloned()
                .collect();
            if kept.len() == tokens.len() {
                false
            } else {
                *value = render_inline(style, &kept, separator);
                true
            }
        };
        self.dirty |= changed;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: &str, b: &str) -> bool {
        a.trim_start_matches('#') == b.trim_start_matches('#')
    }

    fn items(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_read_all_styles() {
        let (fm, _) = Frontmatter::parse("---\na: [x, \"y\"]\nb: x, y\nc: x y\nd:\n  - x\n  - 'y'\n---\n");
        for key in ["a", "b", "c", "d"] {
            assert_eq!(fm.list_items(key), items(&["x", "y"]), "key {key}");
        }
        assert_eq!(fm.list_style("a"), Some(ListStyle::Flow));
        assert_eq!(fm.list_style("d"), Some(ListStyle::Block));
        assert_eq!(fm.list_style("zzz"), None);
    }

    #[test]
    fn test_add_preserves_style() {
        let text = "---\na: [x]\nb: x, y\nd:\n    - x\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(fm.add_list_items("a", &items(&["z"]), same));
        assert!(fm.add_list_items("b", &items(&["z"]), same));
        assert!(fm.add_list_items("d", &items(&["z"]), same));
        assert_eq!(
            fm.splice_into(text),
            "---\na: [x, z]\nb: x, y, z\nd:\n    - x\n    - z\n---\n"
        );
    }

    #[test]
    fn test_add_existing_is_noop() {
        let text = "---\ntags: [active]\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(!fm.add_list_items("tags", &items(&["#active"]), same));
        assert_eq!(fm.splice_into(text), text);
    }

    #[test]
    fn test_add_creates_missing_key() {
        let text = "---\ntitle: t\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(fm.add_list_items("tags", &items(&["a", "b", "a"]), same));
        assert_eq!(fm.splice_into(text), "---\ntitle: t\ntags: [a, b]\n---\n");
    }

    #[test]
    fn test_remove_items() {
        let text = "---\na: [x, y]\nd:\n  - x\n  - y\n---\n";
        let (mut fm, _) = Frontmatter::parse(text);
        assert!(fm.remove_list_items("a", &items(&["x"]), same));
        assert!(fm.remove_list_items("d", &items(&["#y"]), same));
        assert!(!fm.remove_list_items("d", &items(&["nope"]), same));
        assert_eq!(fm.splice_into(text), "---\na: [y]\nd:\n  - x\n---\n");
    }
}
