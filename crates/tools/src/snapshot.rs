//! Project tree scanning for the host.

use quill_core::{FileNode, ProjectSnapshot};
use std::collections::HashSet;
use std::fs::ReadDir;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Build a snapshot of the tree under `root`.
///
/// Directories sort before files, then names case-insensitively. Ignored
/// directories appear as empty nodes and are not descended into. Nodes
/// below `max_depth` are left out. No file contents are loaded.
///
/// Only an unreadable root is an error; an unreadable subdirectory is logged
/// and shows up empty.
pub fn scan_project(
    root: &Path,
    ignored: &[String],
    max_depth: usize,
) -> io::Result<ProjectSnapshot> {
    let ignored: HashSet<&str> = ignored.iter().map(String::as_str).collect();
    let tree = if max_depth == 0 {
        Vec::new()
    } else {
        scan_entries(std::fs::read_dir(root)?, &ignored, 0, max_depth)
    };
    Ok(ProjectSnapshot::new(root).with_tree(tree))
}

/// [`scan_project`] on the blocking pool, for async callers.
pub async fn load_project(
    root: PathBuf,
    ignored: Vec<String>,
    max_depth: usize,
) -> io::Result<ProjectSnapshot> {
    tokio::task::spawn_blocking(move || scan_project(&root, &ignored, max_depth))
        .await
        .map_err(io::Error::other)?
}

fn scan_dir(dir: &Path, ignored: &HashSet<&str>, depth: usize, max_depth: usize) -> Vec<FileNode> {
    if depth >= max_depth {
        return Vec::new();
    }
    match std::fs::read_dir(dir) {
        Ok(entries) => scan_entries(entries, ignored, depth, max_depth),
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            Vec::new()
        }
    }
}

fn scan_entries(
    entries: ReadDir,
    ignored: &HashSet<&str>,
    depth: usize,
    max_depth: usize,
) -> Vec<FileNode> {
    let mut nodes = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        let path_str = path.to_string_lossy().into_owned();

        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                warn!(path = %path_str, error = %e, "Skipping entry with unknown type");
                continue;
            }
        };

        if is_dir {
            let children = if ignored.contains(name.as_str()) {
                Vec::new()
            } else {
                scan_dir(&path, ignored, depth + 1, max_depth)
            };
            nodes.push(FileNode::dir(name, path_str, children));
        } else {
            nodes.push(FileNode::file(name, path_str));
        }
    }

    nodes.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    nodes
}
