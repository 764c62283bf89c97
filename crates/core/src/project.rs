//! Project snapshot: the host's view of the open folder.
//!
//! The core never mutates a snapshot. It reads the tree to build prompts and
//! resolve paths, and reads the content map to seed patch buffers; writes go
//! through a [`crate::store::FileStore`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// One entry of the project tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            children: None,
        }
    }

    pub fn dir(name: impl Into<String>, path: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            children: Some(children),
        }
    }
}

/// Read-only inputs describing the open project.
#[derive(Debug, Clone, Default)]
pub struct ProjectSnapshot {
    /// The opened folder. `None` when no folder is open.
    pub root: Option<PathBuf>,

    /// Top-level entries of the folder.
    pub tree: Vec<FileNode>,

    /// Files currently loaded in memory, keyed by path.
    pub contents: HashMap<String, String>,

    /// The file focused in the editor, if any.
    pub active_file: Option<String>,
}

impl ProjectSnapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn with_tree(mut self, tree: Vec<FileNode>) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.contents.insert(path.into(), content.into());
        self
    }

    pub fn with_active_file(mut self, path: impl Into<String>) -> Self {
        self.active_file = Some(path.into());
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// In-memory content of a file, if loaded.
    pub fn content(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Paths with in-memory content plus every file in the tree, sorted and
    /// deduplicated for deterministic lookups.
    pub fn known_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.contents.keys().map(String::as_str).collect();
        collect_files(&self.tree, &mut paths);
        paths.sort_unstable();
        paths.dedup();
        paths
    }

    /// Content of the active file, or empty when none is focused.
    pub fn active_content(&self) -> &str {
        self.active_file
            .as_deref()
            .and_then(|p| self.content(p))
            .unwrap_or_default()
    }
}

fn collect_files<'a>(nodes: &'a [FileNode], out: &mut Vec<&'a str>) {
    for node in nodes {
        if !node.is_dir {
            out.push(node.path.as_str());
        } else if let Some(children) = &node.children {
            collect_files(children, out);
        }
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
