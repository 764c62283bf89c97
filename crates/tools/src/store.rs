//! Local filesystem implementation of the [`FileStore`] capability.

use async_trait::async_trait;
use quill_core::FileStore;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads and writes files on disk. Relative paths are taken from `root`.
#[derive(Debug, Clone, Default)]
pub struct LocalFileStore {
    root: Option<PathBuf>,
}

impl LocalFileStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        match &self.root {
            Some(root) if candidate.is_relative() => root.join(candidate),
            _ => candidate.to_path_buf(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(self.full_path(path)).await
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(path = %full.display(), bytes = content.len(), "Writing file");
        tokio::fs::write(&full, content).await
    }
}
