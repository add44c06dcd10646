//! Applying a plan to document text
//!
//! Property edits rewrite the frontmatter block in place, or synthesize one
//! at the top of the document when there is none. Tag edits go to inline
//! `#tag` tokens or to the `tags` frontmatter list depending on
//! [`TagStyle`]; removals always clear both. Link edits use inline
//! `[[target]]` tokens. Text outside the regions that change is left
//! byte-identical.

use super::TagStyle;
use super::planner::{Edit, Plan};
use crate::document::bare_tag;
use crate::frontmatter::{Frontmatter, TAGS_KEY};
use crate::inline;

/// New text produced by applying a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub text: String,
    pub changed: bool,
}

fn same_tag(a: &str, b: &str) -> bool {
    bare_tag(a) == bare_tag(b)
}

fn touches_frontmatter(edit: &Edit, style: TagStyle) -> bool {
    match edit {
        Edit::SetProperty { .. } | Edit::RemoveProperty { .. } | Edit::RemoveTags { .. } => true,
        Edit::AddTags { .. } => style == TagStyle::Frontmatter,
        Edit::AddLinks { .. } | Edit::RemoveLinks { .. } => false,
    }
}

/// Apply `plan` to `text`
///
/// Frontmatter is parsed once, before any edit, and spliced back at the end.
/// Body edits in between never touch bytes before the body, so the block's
/// offsets stay valid. Parse problems are not reported here: they were
/// recorded when the document's metadata was extracted.
#[must_use]
pub fn apply(text: &str, plan: &Plan, style: TagStyle) -> Applied {
    if plan.is_empty() {
        return Applied {
            text: text.to_string(),
            changed: false,
        };
    }

    let mut frontmatter = plan
        .edits
        .iter()
        .any(|e| touches_frontmatter(&e.edit, style))
        .then(|| Frontmatter::read(text));

    let mut body = text.to_string();
    for planned in &plan.edits {
        match &planned.edit {
            Edit::SetProperty { key, value } => {
                if let Some(fm) = frontmatter.as_mut() {
                    fm.upsert(key, value);
                }
            }
            Edit::RemoveProperty { key } => {
                if let Some(fm) = frontmatter.as_mut() {
                    fm.remove(key);
                }
            }
            Edit::AddTags { tags } => match frontmatter.as_mut() {
                Some(fm) if style == TagStyle::Frontmatter => {
                    let bare: Vec<String> = tags.iter().map(|t| bare_tag(t).to_string()).collect();
                    fm.add_list_items(TAGS_KEY, &bare, same_tag);
                }
                _ => body = inline::append_line(&body, &tags.join(" ")),
            },
            Edit::RemoveTags { tags } => {
                if let Some(fm) = frontmatter.as_mut() {
                    fm.remove_list_items(TAGS_KEY, tags, same_tag);
                }
                if let Some(updated) = inline::remove_tags(&body, tags) {
                    body = updated;
                }
            }
            Edit::AddLinks { targets } => {
                let line: Vec<String> = targets.iter().map(|t| format!("[[{t}]]")).collect();
                body = inline::append_line(&body, &line.join(" "));
            }
            Edit::RemoveLinks { targets } => {
                if let Some(updated) = inline::unlink(&body, targets) {
                    body = updated;
                }
            }
        }
    }

    let text_out = match frontmatter {
        Some(fm) => fm.splice_into(&body),
        None => body,
    };
    let changed = text_out != text;
    Applied {
        text: text_out,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Modification, PropertyEntry};
    use crate::document::{Metadata, extract};
    use crate::engine::planner::plan;

    fn run(text: &str, modifications: &[Modification], style: TagStyle) -> Applied {
        let (plan, _) = plan(&extract(text).0, modifications);
        apply(text, &plan, style)
    }

    fn set(key: &str, value: &str) -> Modification {
        Modification::Property { add: true, entries: vec![PropertyEntry::new(key, value)] }
    }

    #[test]
    fn test_property_add_synthesizes_block() {
        let applied = run("Body text\n", &[set("status", "done")], TagStyle::Inline);
        assert_eq!(applied.text, "---\nstatus: done\n---\nBody text\n");
        assert!(applied.changed);
    }

    #[test]
    fn test_property_add_is_idempotent() {
        let once = run("---\na: 1\n---\nx\n", &[set("b", "2")], TagStyle::Inline);
        let twice = run(&once.text, &[set("b", "2")], TagStyle::Inline);
        assert_eq!(once.text, twice.text);
        assert!(!twice.changed);
    }

    #[test]
    fn test_property_remove_without_block_is_noop() {
        let modification = Modification::Property { add: false, entries: vec![PropertyEntry::new("x", "")] };
        let applied = run("no frontmatter\n", &[modification], TagStyle::Inline);
        assert!(!applied.changed);
        assert_eq!(applied.text, "no frontmatter\n");
    }

    #[test]
    fn test_unterminated_block_synthesizes_new_block() {
        let applied = run("---\nbroken: yes\n", &[set("status", "done")], TagStyle::Inline);
        assert_eq!(applied.text, "---\nstatus: done\n---\n---\nbroken: yes\n");
        assert!(applied.changed);
    }

    #[test]
    fn test_inline_tag_add_and_remove() {
        let text = "---\ntitle: t\n---\nnotes #draft\n";
        let added = run(
            text,
            &[Modification::Tag { add: true, tags: vec!["#done".into(), "reviewed".into()] }],
            TagStyle::Inline,
        );
        assert_eq!(added.text, "---\ntitle: t\n---\nnotes #draft\n#done #reviewed\n");

        let removed = run(
            &added.text,
            &[Modification::Tag { add: false, tags: vec!["#draft".into(), "#reviewed".into()] }],
            TagStyle::Inline,
        );
        assert_eq!(removed.text, "---\ntitle: t\n---\nnotes\n#done\n");
    }

    #[test]
    fn test_frontmatter_tag_style() {
        let text = "---\ntags: [draft]\n---\nbody\n";
        let added = run(
            text,
            &[Modification::Tag { add: true, tags: vec!["#done".into()] }],
            TagStyle::Frontmatter,
        );
        assert_eq!(added.text, "---\ntags: [draft, done]\n---\nbody\n");

        let removed = run(
            &added.text,
            &[Modification::Tag { add: false, tags: vec!["#draft".into()] }],
            TagStyle::Inline,
        );
        assert_eq!(removed.text, "---\ntags: [done]\n---\nbody\n");
    }

    #[test]
    fn test_link_add_and_unlink() {
        let text = "See [[Old|the old page]].\n";
        let applied = run(
            text,
            &[
                Modification::Link { add: false, targets: vec!["Old".into()] },
                Modification::Link { add: true, targets: vec!["New".into()] },
            ],
            TagStyle::Inline,
        );
        assert_eq!(applied.text, "See the old page.\n[[New]]\n");
    }

    #[test]
    fn test_body_edits_and_property_edits_combine() {
        let text = "---\na: 1\nb: 2\n---\nbody #x\n";
        let applied = run(
            text,
            &[
                set("c", "3"),
                Modification::Tag { add: false, tags: vec!["#x".into()] },
                Modification::Property { add: false, entries: vec![PropertyEntry::new("b", "")] },
            ],
            TagStyle::Inline,
        );
        assert_eq!(applied.text, "---\na: 1\nc: 3\n---\nbody\n");
    }

    #[test]
    fn test_empty_plan_returns_input() {
        let applied = apply("text", &Plan { edits: Vec::new(), metadata: Metadata::default() }, TagStyle::Inline);
        assert_eq!(applied.text, "text");
        assert!(!applied.changed);
    }
}
