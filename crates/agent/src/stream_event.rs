//! Agent-level streaming events.
//!
//! `AgentStreamEvent` wraps provider-level stream chunks into the events a
//! host renders while a request runs: tokens as they arrive, tool activity,
//! and a single terminal `done` or `error`.

use quill_core::AgentResponse;
use serde::{Deserialize, Serialize};

/// Events emitted by the agent loop during one request.
///
/// - `token`: partial text, including synthetic tool notices
/// - `tool_call`: the model asked to inspect a path
/// - `tool_result`: the tool answered (always text)
/// - `done`: terminal intent reached
/// - `error`: the transport failed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Partial text token from the model.
    Token { content: String },

    /// The model is calling a tool.
    ToolCall { tool: String, path: String },

    /// Tool execution completed.
    ToolResult {
        tool: String,
        path: String,
        output: String,
    },

    /// The request reached a terminal intent.
    Done {
        response: AgentResponse,
        iterations: usize,
        tool_calls_made: usize,
    },

    /// An error ended the request.
    Error { message: String },
}

impl AgentStreamEvent {
    /// Event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Token { .. } => "token",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}
