//! `read_file` tool: return a file's full text.

use crate::path::ToolScope;
use async_trait::async_trait;
use quill_core::error::ToolError;
use quill_core::tool::{Tool, ToolResult};
use std::io::ErrorKind;
use tracing::debug;

pub struct ReadFileTool {
    scope: ToolScope,
}

impl ReadFileTool {
    pub fn new(scope: ToolScope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the content of a file you need to inspect."
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let resolved = self
            .scope
            .resolve(path)
            .map_err(|e| ToolError::PermissionDenied {
                tool_name: "read_file".into(),
                reason: e.to_string(),
            })?;

        debug!(path, resolved = %resolved.display(), "Reading file");

        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ToolResult::failed(format!(
                "File not found: {path} (resolved: {})",
                resolved.display()
            ))),
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: "read_file".into(),
                reason: e.to_string(),
            }),
        }
    }
}
