//! Tool execution that always answers with text.

use crate::path::ToolScope;
use quill_core::error::ToolError;
use quill_core::tool::ToolRegistry;
use quill_core::ToolName;
use tracing::{debug, warn};

/// Runs tool calls from the model and turns every outcome into text.
pub struct ToolExecutor {
    registry: ToolRegistry,
}

impl ToolExecutor {
    /// An executor with `read_file` and `list_directory` bound to `scope`.
    pub fn new(scope: ToolScope) -> Self {
        Self::with_registry(crate::default_registry(scope))
    }

    pub fn with_registry(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// `(name, description)` pairs for the system prompt.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.registry
            .descriptions()
            .into_iter()
            .map(|(name, description)| (name.to_string(), description.to_string()))
            .collect()
    }

    /// Execute `tool` on `path`. Never fails: errors become descriptive text.
    pub async fn execute(&self, tool: &ToolName, path: &str) -> String {
        let arguments = serde_json::json!({ "path": path });

        match self.registry.execute(tool.as_str(), arguments).await {
            Ok(result) => {
                debug!(tool = %tool, path, success = result.success, "Tool executed");
                result.output
            }
            Err(ToolError::NotFound(_)) => {
                warn!(tool = %tool, "Model requested an unknown tool");
                format!("Unknown tool: {tool}")
            }
            Err(ToolError::PermissionDenied { reason, .. }) => {
                warn!(tool = %tool, path, %reason, "Tool access denied");
                format!("Access denied: {reason}")
            }
            Err(ToolError::ExecutionFailed { reason, .. }) => {
                warn!(tool = %tool, path, %reason, "Tool execution failed");
                format!("Error executing \"{tool}\" on \"{path}\": {reason}")
            }
            Err(e @ ToolError::InvalidArguments(_)) => {
                format!("Error executing \"{tool}\" on \"{path}\": {e}")
            }
        }
    }
}
