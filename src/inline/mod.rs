//! Inline `#tag` and `[[link]]` tokens in the document body
//!
//! The body is everything after the frontmatter block. Fenced code blocks
//! are skipped both when reading and when editing. All edits are line-local:
//! lines that contain no affected token come out byte-identical.

use crate::document::{normalize_link, normalize_tag};
use crate::frontmatter;
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[ \t])(#[\p{L}\p{N}_/-]+)").expect("tag pattern is valid")
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").expect("link pattern is valid"));

static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_/-]+$").expect("tag name pattern is valid"));

/// A tag token must contain at least one non-digit after the `#`
fn is_valid_tag(token: &str) -> bool {
    token[1..].chars().any(|c| !c.is_ascii_digit())
}

/// Whether `name` (without `#`) is read back as exactly one tag token
#[must_use]
pub fn is_writable_tag(name: &str) -> bool {
    TAG_NAME_RE.is_match(name) && name.chars().any(|c| !c.is_ascii_digit())
}

/// Body lines outside fenced code blocks, with their absolute byte offsets
///
/// Each yielded line still carries its line ending.
fn body_lines(text: &str) -> Vec<(usize, &str)> {
    scan_body(text).0
}

/// Fence marker of a code block still open at the end of `text`
fn open_fence(text: &str) -> Option<&'static str> {
    scan_body(text).1
}

fn scan_body(text: &str) -> (Vec<(usize, &str)>, Option<&'static str>) {
    let start = frontmatter::body_start(text);
    let mut out = Vec::new();
    let mut offset = start;
    let mut fence: Option<&'static str> = None;

    for line in text[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        let marker = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m));
        match (fence, marker) {
            (None, Some(m)) => fence = Some(m),
            (Some(open), Some(m)) if open == m => fence = None,
            (None, None) => out.push((offset, line)),
            _ => {}
        }
        offset += line.len();
    }
    (out, fence)
}

fn split_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

/// `(start, end, normalized tag)` for each tag token in one line
fn line_tags(content: &str) -> Vec<(usize, usize, String)> {
    TAG_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .filter(|m| is_valid_tag(m.as_str()))
        .map(|m| (m.start(), m.end(), normalize_tag(m.as_str())))
        .collect()
}

struct LinkToken {
    start: usize,
    end: usize,
    target: String,
    display: String,
}

fn line_links(content: &str) -> Vec<LinkToken> {
    LINK_RE
        .captures_iter(content)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let inner = c.get(1)?.as_str();
            if content[..whole.start()].ends_with('!') {
                return None;
            }
            let target = normalize_link(inner);
            if target.is_empty() {
                return None;
            }
            let display = inner
                .split_once('|')
                .map_or_else(|| target.clone(), |(_, alias)| alias.trim().to_string());
            Some(LinkToken {
                start: whole.start(),
                end: whole.end(),
                target,
                display,
            })
        })
        .collect()
}

/// Tags written inline in the body, normalized, in document order
#[must_use]
pub fn tags(text: &str) -> Vec<String> {
    body_lines(text)
        .into_iter()
        .flat_map(|(_, line)| line_tags(split_ending(line).0).into_iter().map(|(_, _, t)| t))
        .collect()
}

/// Link targets written in the body, in document order
#[must_use]
pub fn links(text: &str) -> Vec<String> {
    body_lines(text)
        .into_iter()
        .flat_map(|(_, line)| line_links(split_ending(line).0).into_iter().map(|l| l.target))
        .collect()
}

/// Rewrite body lines with `edit`, dropping lines that an edit emptied
///
/// `edit` returns the new line content when it changed something.
fn rewrite_lines<F>(text: &str, mut edit: F) -> Option<String>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut changed = false;

    for (offset, line) in body_lines(text) {
        let (content, ending) = split_ending(line);
        let Some(new_content) = edit(content) else {
            continue;
        };
        changed = true;
        out.push_str(&text[cursor..offset]);
        if !new_content.trim().is_empty() {
            out.push_str(&new_content);
            out.push_str(ending);
        }
        cursor = offset + line.len();
    }

    if !changed {
        return None;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}

/// Remove every inline occurrence of `targets` (normalized tags)
///
/// Each token is removed with one adjacent blank. A line left blank by the
/// removal is deleted. Returns `None` when nothing matched.
#[must_use]
pub fn remove_tags(text: &str, targets: &[String]) -> Option<String> {
    rewrite_lines(text, |content| {
        let hits: Vec<_> = line_tags(content)
            .into_iter()
            .filter(|(_, _, tag)| targets.contains(tag))
            .collect();
        if hits.is_empty() {
            return None;
        }

        let mut new = String::with_capacity(content.len());
        let mut cursor = 0;
        for (start, end, _) in hits {
            let before = &content[cursor..start];
            let mut end = end;
            if let Some(trimmed) = before.strip_suffix([' ', '\t']) {
                new.push_str(trimmed);
            } else {
                new.push_str(before);
                if content[end..].starts_with([' ', '\t']) {
                    end += 1;
                }
            }
            cursor = end;
        }
        new.push_str(&content[cursor..]);
        Some(new)
    })
}

/// Replace links to `targets` with their display text
///
/// Returns `None` when nothing matched.
#[must_use]
pub fn unlink(text: &str, targets: &[String]) -> Option<String> {
    rewrite_lines(text, |content| {
        let hits: Vec<_> = line_links(content)
            .into_iter()
            .filter(|l| targets.contains(&l.target))
            .collect();
        if hits.is_empty() {
            return None;
        }

        let mut new = String::with_capacity(content.len());
        let mut cursor = 0;
        for link in hits {
            new.push_str(&content[cursor..link.start]);
            new.push_str(&link.display);
            cursor = link.end;
        }
        new.push_str(&content[cursor..]);
        Some(new)
    })
}

/// Append `line` as a new last line of `text`
///
/// A document ending in a newline keeps ending in one; a document without a
/// final newline still has none. A code block left open at the end of the
/// document is closed first so the new line stays outside it.
#[must_use]
pub fn append_line(text: &str, line: &str) -> String {
    let ending = frontmatter::preferred_line_ending(text);
    let terminated = text.is_empty() || text.ends_with('\n');
    let mut out = String::with_capacity(text.len() + line.len() + 8);
    out.push_str(text);
    if !terminated {
        out.push_str(ending);
    }
    if let Some(fence) = open_fence(text) {
        out.push_str(fence);
        out.push_str(ending);
    }
    out.push_str(line);
    if terminated {
        out.push_str(ending);
    }
    out
}
