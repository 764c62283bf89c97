//! Tool path resolution and optional project containment.
//!
//! Paths from the model are used as-is when absolute (or when they carry a
//! drive marker), otherwise joined onto the project root. Containment is off
//! unless the scope asks for it.

use quill_core::normalize_lexically;
use std::path::{Path, PathBuf};

/// Error returned when path validation fails.
#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    #[error("Path '{path}' is outside the project root")]
    OutsideRoot { path: String },

    #[error("Path '{path}' cannot be checked without a project root")]
    NoRoot { path: String },
}

/// Resolve a model-supplied path against the project root.
pub fn resolve_tool_path(raw: &str, root: Option<&Path>) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() || raw.contains(':') {
        return candidate.to_path_buf();
    }
    match root {
        Some(root) => root.join(candidate),
        None => candidate.to_path_buf(),
    }
}

/// Where the tools look and whether they may leave the project.
#[derive(Debug, Clone, Default)]
pub struct ToolScope {
    pub root: Option<PathBuf>,
    /// Deny reads that resolve outside `root`.
    pub restrict_to_project: bool,
}

impl ToolScope {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            restrict_to_project: false,
        }
    }

    pub fn restricted(mut self, restrict: bool) -> Self {
        self.restrict_to_project = restrict;
        self
    }

    /// Resolve `raw` and, when restricted, check it stays inside the root.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathValidationError> {
        let resolved = resolve_tool_path(raw, self.root.as_deref());
        if !self.restrict_to_project {
            return Ok(resolved);
        }

        let Some(root) = &self.root else {
            return Err(PathValidationError::NoRoot { path: raw.into() });
        };

        let root = canonicalize_existing_prefix(root);
        let target = canonicalize_existing_prefix(&resolved);
        if target.starts_with(&root) {
            Ok(resolved)
        } else {
            Err(PathValidationError::OutsideRoot { path: raw.into() })
        }
    }
}

/// Canonicalize the deepest existing ancestor (following symlinks) and
/// re-append the part that does not exist yet.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let normalized = normalize_lexically(path);
    for ancestor in normalized.ancestors() {
        if let Ok(canonical) = ancestor.canonicalize()
            && let Ok(rest) = normalized.strip_prefix(ancestor)
        {
            return canonical.join(rest);
        }
    }
    normalized
}
