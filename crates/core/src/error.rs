//! Error types for the Quill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type.

use thiserror::Error;

// --- Bounded context errors ---

/// Transport-level failures talking to the inference server.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Why a single edit could not be applied to its target content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("search text not found in {file}")]
    SearchNotFound { file: String },

    #[error("edit for {file} has no search text and no content")]
    MissingSearch { file: String },

    #[error("could not resolve a target path for {file}")]
    Unresolvable { file: String },

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}
