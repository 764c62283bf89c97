//! `list_directory` tool: one entry name per line, sorted.

use crate::path::ToolScope;
use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::tool::{Tool, ToolResult};
use std::io::ErrorKind;
use tracing::debug;

pub struct ListDirectoryTool {
    scope: ToolScope,
}

impl ListDirectoryTool {
    pub fn new(scope: ToolScope) -> Self {
        Self { scope }
    }
}

fn execution_failed(e: std::io::Error) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: "list_directory".into(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List files/folders inside a path."
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let resolved = self
            .scope
            .resolve(path)
            .map_err(|e| ToolError::PermissionDenied {
                tool_name: "list_directory".into(),
                reason: e.to_string(),
            })?;

        debug!(path, resolved = %resolved.display(), "Listing directory");

        let mut entries = match tokio::fs::read_dir(&resolved).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(ToolResult::failed(format!(
                    "Directory not found: {path} (resolved: {})",
                    resolved.display()
                )));
            }
            Err(e) => return Err(execution_failed(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(execution_failed)? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(ToolResult::ok(names.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.ts"), "").unwrap();
        std::fs::write(dir.path().join("a.ts"), "").unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();

        let tool = ListDirectoryTool::new(ToolScope::new(Some(dir.path().to_path_buf())));
        let result = tool
            .execute(serde_json::json!({ "path": "." }))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "a.ts\nb.ts\nlib");
    }

    #[tokio::test]
    async fn empty_directory_is_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListDirectoryTool::new(ToolScope::new(Some(dir.path().to_path_buf())));
        let result = tool
            .execute(serde_json::json!({ "path": dir.path().to_str().unwrap() }))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.is_empty());
    }

    #[tokio::test]
    async fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ListDirectoryTool::new(ToolScope::new(Some(dir.path().to_path_buf())));
        let result = tool
            .execute(serde_json::json!({ "path": "nope" }))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.starts_with("Directory not found: nope (resolved: "));
    }

    #[tokio::test]
    async fn listing_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "").unwrap();
        let tool = ListDirectoryTool::new(ToolScope::new(Some(dir.path().to_path_buf())));
        let err = tool
            .execute(serde_json::json!({ "path": "a.ts" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }
}
