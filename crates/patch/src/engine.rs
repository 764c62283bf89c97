//! Single-edit application.

use crate::fuzzy;
use quill_core::{Edit, EditAction, PatchError};
use tracing::debug;

/// Apply one edit to a file's content.
///
/// `current` is `None` when the target has no known content (a new file).
/// On failure nothing is returned, so a caller's buffer stays as it was.
pub fn apply(edit: &Edit, current: Option<&str>) -> Result<String, PatchError> {
    match edit.action {
        EditAction::Create => Ok(edit.content.clone().unwrap_or_default()),
        EditAction::Delete => Ok(String::new()),
        EditAction::Replace => match current {
            None => Ok(edit
                .replace
                .clone()
                .or_else(|| edit.content.clone())
                .unwrap_or_default()),
            Some(content) => apply_replace(edit, content),
        },
    }
}

fn apply_replace(edit: &Edit, content: &str) -> Result<String, PatchError> {
    let Some(search) = edit.search.as_deref().filter(|s| !s.is_empty()) else {
        // A replace without a SEARCH block carries the whole new body.
        return edit.content.clone().ok_or_else(|| PatchError::MissingSearch {
            file: edit.file.clone(),
        });
    };
    let replacement = edit.replace.as_deref().unwrap_or_default();

    if let Some(pos) = content.find(search) {
        let mut out = String::with_capacity(content.len() - search.len() + replacement.len());
        out.push_str(&content[..pos]);
        out.push_str(replacement);
        out.push_str(&content[pos + search.len()..]);
        return Ok(out);
    }

    if let Some(out) = fuzzy::replace_lines(content, search, replacement) {
        debug!(file = %edit.file, edit_id = %edit.id, "Applied edit with fuzzy line match");
        return Ok(out);
    }

    Err(PatchError::SearchNotFound {
        file: edit.file.clone(),
    })
}
