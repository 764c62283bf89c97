//! Read-only project tools and local file access for Quill.
//!
//! The model may inspect the project mid-conversation through two tools,
//! `read_file` and `list_directory`. The [`ToolExecutor`] runs them and
//! always answers with text, because the result is fed back to the model
//! rather than raised to the caller.
//!
//! This crate also provides the host-side filesystem pieces: a
//! [`LocalFileStore`] for applying edits and [`scan_project`] for building
//! the project snapshot.

pub mod executor;
pub mod list_directory;
pub mod path;
pub mod read_file;
pub mod snapshot;
pub mod store;

pub use executor::ToolExecutor;
pub use list_directory::ListDirectoryTool;
pub use path::{PathValidationError, ToolScope, resolve_tool_path};
pub use read_file::ReadFileTool;
pub use snapshot::{load_project, scan_project};
pub use store::LocalFileStore;

use quill_core::tool::ToolRegistry;

/// Create a registry with both inspection tools bound to `scope`.
pub fn default_registry(scope: ToolScope) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ReadFileTool::new(scope.clone())));
    registry.register(Box::new(ListDirectoryTool::new(scope)));
    registry
}
