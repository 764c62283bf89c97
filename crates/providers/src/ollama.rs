//! Ollama provider implementation.
//!
//! Talks to a local Ollama server:
//! - `POST /api/chat` streaming NDJSON for the agent conversation
//! - `POST /api/generate` non-streaming for inline completion
//! - `GET /api/tags` for model listing and health checks

use crate::ndjson::NdjsonDecoder;
use async_trait::async_trait;
use futures::StreamExt;
use quill_config::OllamaConfig;
use quill_core::error::ProviderError;
use quill_core::provider::*;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// An Ollama inference server.
pub struct OllamaProvider {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the server at `base_url`.
    ///
    /// Only the connect phase has a timeout; a chat stream runs until it
    /// completes, fails, or its receiver is dropped.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_connect_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_connect_timeout(base_url: impl Into<String>, connect_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_default();

        Self {
            name: "ollama".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::with_connect_timeout(
            &config.base_url,
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success status to a provider error, consuming the body.
    async fn status_error(response: reqwest::Response, model: &str) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        warn!(status, body = %message, "Ollama returned error");

        if status == 404 {
            ProviderError::ModelNotFound(model.to_string())
        } else {
            ProviderError::ApiError {
                status_code: status,
                message,
            }
        }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl quill_core::Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ChunkReceiver, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "stream": true,
        });

        debug!(
            provider = %self.name,
            model = %request.model,
            turns = request.messages.len(),
            "Sending streaming chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, &request.model).await);
        }

        let (tx, rx) = mpsc::channel(64);
        let provider_name = self.name.clone();

        // Reader task: owns the response body. Returning from it drops the
        // body, which closes the connection.
        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut decoder = NdjsonDecoder::new();

            loop {
                let next = tokio::select! {
                    _ = tx.closed() => {
                        debug!(provider = %provider_name, "Chat stream receiver dropped, aborting");
                        return;
                    }
                    next = byte_stream.next() => next,
                };

                let bytes = match next {
                    Some(Ok(b)) => b,
                    Some(Err(e)) => {
                        let _ = tx
                            .send(Err(ProviderError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                    None => break,
                };

                for line in decoder.feed(&bytes) {
                    if forward_line(&tx, &provider_name, &line).await.is_break() {
                        return;
                    }
                }
            }

            if let Some(line) = decoder.finish()
                && forward_line(&tx, &provider_name, &line).await.is_break()
            {
                return;
            }

            let _ = tx
                .send(Err(ProviderError::StreamInterrupted(
                    "stream ended before the done marker".into(),
                )))
                .await;
        });

        Ok(rx)
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": request.options,
        });

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response, &request.model).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::StreamInterrupted(e.to_string()))?;

        match serde_json::from_str::<GenerateResponse>(&text) {
            Ok(parsed) => Ok(parsed.response),
            Err(e) => {
                warn!(provider = %self.name, error = %e, "Unparseable completion body");
                Ok(String::new())
            }
        }
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

/// Forward one NDJSON line to the consumer.
///
/// Breaks when the stream is finished: done marker seen, server-side error,
/// or the receiver is gone.
async fn forward_line(
    tx: &mpsc::Sender<std::result::Result<StreamChunk, ProviderError>>,
    provider: &str,
    line: &str,
) -> std::ops::ControlFlow<()> {
    use std::ops::ControlFlow;

    let parsed: ChatLine = match serde_json::from_str(line) {
        Ok(p) => p,
        Err(e) => {
            debug!(provider = %provider, line = %line, error = %e, "Skipping malformed stream line");
            return ControlFlow::Continue(());
        }
    };

    if let Some(error) = parsed.error {
        let _ = tx.send(Err(ProviderError::StreamInterrupted(error))).await;
        return ControlFlow::Break(());
    }

    if let Some(message) = parsed.message
        && !message.content.is_empty()
        && tx.send(Ok(StreamChunk::token(message.content))).await.is_err()
    {
        return ControlFlow::Break(());
    }

    if parsed.done {
        let _ = tx.send(Ok(StreamChunk::done())).await;
        return ControlFlow::Break(());
    }

    ControlFlow::Continue(())
}

// --- Ollama API types (internal) ---

/// One line of a `/api/chat` stream.
#[derive(Debug, Deserialize)]
struct ChatLine {
    #[serde(default)]
    message: Option<ChatLineMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatLineMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}
