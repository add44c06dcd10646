//! Target matching: is a document in scope for an action?

use crate::actions::Targets;
use crate::document::{Document, Metadata, normalize_tag};
use std::path::Path;

/// Check whether `document` satisfies every present constraint of `targets`
///
/// The folder constraint is compared per path component, so `notes` matches
/// `notes/a.md` and `notes/sub/b.md` but not `notes2/a.md`.
#[must_use]
pub fn matches(document: &Document, targets: &Targets) -> bool {
    matches_parts(&document.path, &document.metadata, targets)
}

pub(crate) fn matches_parts(path: &Path, metadata: &Metadata, targets: &Targets) -> bool {
    let folder_ok = targets
        .parent_folder
        .as_deref()
        .is_none_or(|folder| in_folder(path, folder));

    let tags_ok = targets.required_tags.as_ref().is_none_or(|required| {
        let tags = metadata.tag_set();
        required.iter().all(|t| tags.contains(&normalize_tag(t)))
    });

    let keys_ok = targets.required_property_keys.as_ref().is_none_or(|required| {
        let keys = metadata.property_keys();
        required.iter().all(|k| keys.contains(k.trim()))
    });

    folder_ok && tags_ok && keys_ok
}

fn in_folder(path: &Path, folder: &str) -> bool {
    let folder = folder.trim().trim_matches('/');
    let path = path.strip_prefix("/").unwrap_or(path);
    path.parent().is_some_and(|parent| parent.starts_with(folder))
}
