//! Shared test helpers: scripted providers for driving the loop.

use crate::stream_event::AgentStreamEvent;
use async_trait::async_trait;
use quill_core::{ChatRequest, ChunkReceiver, Provider, ProviderError, StreamChunk};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

/// A provider that replays one scripted token list per request.
///
/// Each call to `stream_chat` streams the next script followed by a done
/// marker. Requests are recorded for inspection.
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Vec<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Vec<&str>>) -> Self {
        Self {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|s| s.into_iter().map(String::from).collect())
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<ChunkReceiver, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let Some(script) = self.scripts.lock().unwrap().pop_front() else {
            return Err(ProviderError::NotConfigured("script exhausted".into()));
        };

        let (tx, rx) = mpsc::channel(script.len() + 1);
        for token in script {
            let _ = tx.try_send(Ok(StreamChunk::token(token)));
        }
        let _ = tx.try_send(Ok(StreamChunk::done()));
        Ok(rx)
    }
}

/// A provider that streams a few tokens and then never finishes.
///
/// [`severed`](Self::severed) resolves once the consumer drops its receiver.
pub struct PendingProvider {
    tokens: Vec<String>,
    severed: Arc<Notify>,
}

impl PendingProvider {
    pub fn new(tokens: Vec<&str>) -> Self {
        Self {
            tokens: tokens.into_iter().map(String::from).collect(),
            severed: Arc::new(Notify::new()),
        }
    }

    pub async fn severed(&self) {
        self.severed.notified().await;
    }
}

#[async_trait]
impl Provider for PendingProvider {
    fn name(&self) -> &str {
        "pending"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> Result<ChunkReceiver, ProviderError> {
        let (tx, rx) = mpsc::channel(16);
        let tokens = self.tokens.clone();
        let severed = self.severed.clone();
        tokio::spawn(async move {
            for token in tokens {
                if tx.send(Ok(StreamChunk::token(token))).await.is_err() {
                    break;
                }
            }
            tx.closed().await;
            severed.notify_one();
        });
        Ok(rx)
    }
}

/// A provider whose stream breaks after one token.
pub struct FailingProvider;

#[async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> Result<ChunkReceiver, ProviderError> {
        let (tx, rx) = mpsc::channel(2);
        let _ = tx.try_send(Ok(StreamChunk::token("partial")));
        let _ = tx.try_send(Err(ProviderError::StreamInterrupted(
            "connection reset".into(),
        )));
        Ok(rx)
    }
}

/// Collect every event until the sender side is gone.
pub async fn drain(mut rx: mpsc::Receiver<AgentStreamEvent>) -> Vec<AgentStreamEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}
