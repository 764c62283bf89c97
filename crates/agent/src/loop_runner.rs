//! The agentic tool-use loop.
//!
//! One request walks an explicit state machine:
//!
//! ```text
//! Requesting ──▶ Streaming ──▶ Classifying ──┬──▶ terminal intent (Done)
//!     ▲                                      │
//!     └────────────── ToolExecuting ◀────────┘ tool_call
//! ```
//!
//! The working turn list is owned by the loop; the caller's turns are never
//! touched, so a cancelled or failed request leaves history as it was.

use crate::handle::RequestHandle;
use crate::stream_event::AgentStreamEvent;
use quill_config::AppConfig;
use quill_core::{
    AgentResponse, ChatRequest, ChunkReceiver, Provider, ProviderError, ToolName, Turn,
};
use quill_protocol::{classify, frame_tool_result, tool_notice};
use quill_tools::ToolExecutor;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("request cancelled")]
    Cancelled,

    #[error("tool budget exhausted after {0} tool calls")]
    ToolBudgetExhausted(u32),
}

/// The result of a request that reached a terminal intent.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub response: AgentResponse,
    /// Accumulated text of the final model turn.
    pub raw_text: String,
    /// Working turns as sent on the last request, tool exchanges included.
    pub turns: Vec<Turn>,
    pub iterations: usize,
    pub tool_calls_made: usize,
}

enum LoopState {
    Requesting,
    Streaming(ChunkReceiver),
    Classifying(String),
    ToolExecuting {
        tool: ToolName,
        path: String,
        raw_text: String,
    },
}

/// Drives model requests and tool calls until a terminal intent.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolExecutor>,
    model: String,
    /// Unset means unbounded.
    max_tool_rounds: Option<u32>,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolExecutor>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            tools,
            model: model.into(),
            max_tool_rounds: None,
        }
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolExecutor>,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, tools, &config.default_model)
            .with_max_tool_rounds(config.agent.max_tool_rounds)
    }

    pub fn with_max_tool_rounds(mut self, max: Option<u32>) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    /// Run one request over `turns` (system prompt first).
    ///
    /// Emits tokens and tool activity on `events`, then exactly one `Done` on
    /// success or one `Error` on failure. Cancellation emits neither.
    pub async fn run(
        &self,
        turns: &[Turn],
        handle: &RequestHandle,
        events: &mpsc::Sender<AgentStreamEvent>,
    ) -> Result<LoopOutcome, AgentError> {
        let mut working = turns.to_vec();
        let mut state = LoopState::Requesting;
        let mut iterations = 0;
        let mut tool_calls_made = 0;

        info!(model = %self.model, turns = working.len(), "Agent request started");

        loop {
            state = match state {
                LoopState::Requesting => {
                    if handle.is_cancelled() {
                        return Err(self.cancelled(iterations));
                    }
                    iterations += 1;
                    debug!(iteration = iterations, "Opening chat stream");

                    let request = ChatRequest {
                        model: self.model.clone(),
                        messages: working.clone(),
                    };
                    let opened = tokio::select! {
                        biased;
                        _ = handle.cancelled() => return Err(self.cancelled(iterations)),
                        opened = self.provider.stream_chat(request) => opened,
                    };
                    match opened {
                        Ok(rx) => LoopState::Streaming(rx),
                        Err(e) => return Err(fail(events, handle, e).await),
                    }
                }

                LoopState::Streaming(mut rx) => {
                    let mut text = String::new();
                    loop {
                        let next = tokio::select! {
                            biased;
                            _ = handle.cancelled() => return Err(self.cancelled(iterations)),
                            next = rx.recv() => next,
                        };
                        match next {
                            Some(Ok(chunk)) => {
                                if !chunk.content.is_empty() {
                                    text.push_str(&chunk.content);
                                    emit(events, handle, AgentStreamEvent::Token {
                                        content: chunk.content,
                                    })
                                    .await?;
                                }
                                if chunk.done {
                                    break;
                                }
                            }
                            Some(Err(e)) => return Err(fail(events, handle, e).await),
                            None => {
                                let e = ProviderError::StreamInterrupted(
                                    "stream closed before the done marker".into(),
                                );
                                return Err(fail(events, handle, e).await);
                            }
                        }
                    }
                    LoopState::Classifying(text)
                }

                LoopState::Classifying(raw_text) => match classify(&raw_text) {
                    AgentResponse::ToolCall { tool, path } => LoopState::ToolExecuting {
                        tool,
                        path,
                        raw_text,
                    },
                    response => {
                        info!(
                            kind = response.kind(),
                            iterations, tool_calls_made, "Agent request finished"
                        );
                        emit(events, handle, AgentStreamEvent::Done {
                            response: response.clone(),
                            iterations,
                            tool_calls_made,
                        })
                        .await?;
                        return Ok(LoopOutcome {
                            response,
                            raw_text,
                            turns: working,
                            iterations,
                            tool_calls_made,
                        });
                    }
                },

                LoopState::ToolExecuting {
                    tool,
                    path,
                    raw_text,
                } => {
                    if let Some(max) = self.max_tool_rounds
                        && tool_calls_made >= max as usize
                    {
                        warn!(max, "Tool round budget exhausted");
                        let err = AgentError::ToolBudgetExhausted(max);
                        emit(events, handle, AgentStreamEvent::Error {
                            message: err.to_string(),
                        })
                        .await?;
                        return Err(err);
                    }
                    tool_calls_made += 1;

                    emit(events, handle, AgentStreamEvent::Token {
                        content: tool_notice(&path),
                    })
                    .await?;
                    emit(events, handle, AgentStreamEvent::ToolCall {
                        tool: tool.to_string(),
                        path: path.clone(),
                    })
                    .await?;

                    let output = tokio::select! {
                        biased;
                        _ = handle.cancelled() => return Err(self.cancelled(iterations)),
                        output = self.tools.execute(&tool, &path) => output,
                    };
                    debug!(tool = %tool, path = %path, bytes = output.len(), "Tool answered");

                    emit(events, handle, AgentStreamEvent::ToolResult {
                        tool: tool.to_string(),
                        path: path.clone(),
                        output: output.clone(),
                    })
                    .await?;

                    let call = AgentResponse::ToolCall {
                        tool: tool.clone(),
                        path: path.clone(),
                    };
                    let logged = serde_json::to_string(&call).unwrap_or(raw_text);
                    working.push(Turn::assistant(logged));
                    working.push(Turn::user(frame_tool_result(&tool, &path, &output)));

                    LoopState::Requesting
                }
            };
        }
    }

    fn cancelled(&self, iterations: usize) -> AgentError {
        info!(iterations, "Agent request cancelled");
        AgentError::Cancelled
    }
}

/// Send one event, giving up if the request is cancelled while the channel
/// is full.
async fn emit(
    events: &mpsc::Sender<AgentStreamEvent>,
    handle: &RequestHandle,
    event: AgentStreamEvent,
) -> Result<(), AgentError> {
    tokio::select! {
        biased;
        _ = handle.cancelled() => {
            info!("Agent request cancelled while emitting");
            Err(AgentError::Cancelled)
        }
        sent = events.send(event) => {
            if sent.is_err() {
                debug!("Event receiver dropped");
            }
            Ok(())
        }
    }
}

async fn fail(
    events: &mpsc::Sender<AgentStreamEvent>,
    handle: &RequestHandle,
    e: ProviderError,
) -> AgentError {
    warn!(error = %e, "Agent request failed");
    let event = AgentStreamEvent::Error {
        message: e.to_string(),
    };
    match emit(events, handle, event).await {
        Ok(()) => AgentError::Provider(e),
        Err(cancelled) => cancelled,
    }
}
