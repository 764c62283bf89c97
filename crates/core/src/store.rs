//! FileStore trait: the read/write capability the host lends the core.
//!
//! The batch applier seeds buffers through `read` when a file is not loaded
//! in memory and persists results through `write`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Read a file as UTF-8 text.
    async fn read(&self, path: &str) -> io::Result<String>;

    /// Replace the file's content, creating it (and parent directories) if needed.
    async fn write(&self, path: &str, content: &str) -> io::Result<()>;
}

/// A file store held entirely in memory. Used for dry runs and tests.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.into());
        }
        self
    }

    /// Current content of a file.
    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// Paths written so far, in write order (one entry per write).
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("in-memory file store lock poisoned")
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn read(&self, path: &str) -> io::Result<String> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{path} not found"))
        })
    }

    async fn write(&self, path: &str, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .map_err(|_| poisoned())?
            .insert(path.to_string(), content.to_string());
        self.writes.lock().map_err(|_| poisoned())?.push(path.to_string());
        Ok(())
    }
}
