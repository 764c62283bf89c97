//! A file store that reads from disk and keeps writes in memory.

use async_trait::async_trait;
use quill_core::{FileStore, InMemoryFileStore};
use quill_tools::LocalFileStore;
use std::io;

pub struct DryRunStore {
    disk: LocalFileStore,
    pending: InMemoryFileStore,
}

impl DryRunStore {
    pub fn new(disk: LocalFileStore) -> Self {
        Self {
            disk,
            pending: InMemoryFileStore::new(),
        }
    }

    /// Paths that would have been written, in write order.
    pub fn writes(&self) -> Vec<String> {
        self.pending.writes()
    }
}

#[async_trait]
impl FileStore for DryRunStore {
    async fn read(&self, path: &str) -> io::Result<String> {
        match self.pending.get(path) {
            Some(content) => Ok(content),
            None => self.disk.read(path).await,
        }
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        self.pending.write(path, content).await
    }
}
