//! Provider trait: the abstraction over the local inference server.
//!
//! A Provider knows how to stream a chat conversation back as incremental
//! text fragments, and how to run a single non-streaming completion used for
//! inline fill-in-the-middle suggestions.

use crate::error::ProviderError;
use crate::message::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A streaming chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "qwen3-coder:480b-cloud")
    pub model: String,

    /// The conversation turns, system prompt first
    pub messages: Vec<Turn>,
}

/// Sampling options for a non-streaming completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Maximum tokens to predict
    pub num_predict: u32,

    /// Temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// A single-shot completion request (inline code completion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub options: GenerateOptions,
}

/// A single chunk in a streaming response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Incremental text fragment (may be empty)
    #[serde(default)]
    pub content: String,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,
}

impl StreamChunk {
    pub fn token(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// Receiving half of a chat stream. Dropping it aborts the request.
pub type ChunkReceiver = mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>;

/// The core Provider trait.
///
/// The agent loop calls `stream_chat()` without knowing which backend is
/// serving it, which keeps the loop testable against scripted providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Open a streaming chat request.
    ///
    /// Fragments arrive in order; the last item is either a chunk with
    /// `done = true` or an error. Dropping the receiver severs the request.
    async fn stream_chat(&self, request: ChatRequest)
    -> std::result::Result<ChunkReceiver, ProviderError>;

    /// Run a single non-streaming completion and return the generated text.
    async fn generate(
        &self,
        _request: GenerateRequest,
    ) -> std::result::Result<String, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support completions",
            self.name()
        )))
    }

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}
