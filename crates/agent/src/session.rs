//! A chat session: conversation history plus the active request.
//!
//! The session builds the system prompt from the project snapshot, runs the
//! loop, and commits the exchange to history only when the loop succeeds.

use crate::handle::RequestHandle;
use crate::loop_runner::{AgentError, AgentLoop, LoopOutcome};
use crate::stream_event::AgentStreamEvent;
use quill_config::AppConfig;
use quill_core::{AgentResponse, Conversation, FileStore, ProjectSnapshot, Turn};
use quill_patch::resolve_target;
use quill_protocol::{
    ChatContext, PinnedFile, SelectedCode, approval_hint, build_system_prompt, extract_mentions,
    is_approval, is_plan_file, render_plan_markdown,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One user message and the optional code range it refers to.
#[derive(Debug, Clone, Default)]
pub struct UserMessage {
    pub text: String,
    pub selection: Option<SelectedCode>,
}

impl UserMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
        }
    }

    pub fn with_selection(mut self, selection: SelectedCode) -> Self {
        self.selection = Some(selection);
        self
    }
}

impl From<&str> for UserMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for UserMessage {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

pub struct ChatSession {
    agent: AgentLoop,
    store: Arc<dyn FileStore>,
    conversation: Conversation,
    active: Option<RequestHandle>,
    plan_file: String,
    ai_ignored: Vec<String>,
    persist_plans: bool,
    /// The last terminal intent was a plan still awaiting approval.
    plan_pending: bool,
}

impl ChatSession {
    pub fn new(agent: AgentLoop, store: Arc<dyn FileStore>) -> Self {
        let defaults = AppConfig::default();
        Self {
            agent,
            store,
            conversation: Conversation::new(),
            active: None,
            plan_file: defaults.workspace.plan_file,
            ai_ignored: defaults.workspace.ai_ignored,
            persist_plans: defaults.agent.persist_plans,
            plan_pending: false,
        }
    }

    pub fn from_config(agent: AgentLoop, store: Arc<dyn FileStore>, config: &AppConfig) -> Self {
        Self {
            plan_file: config.workspace.plan_file.clone(),
            ai_ignored: config.workspace.ai_ignored.clone(),
            persist_plans: config.agent.persist_plans,
            ..Self::new(agent, store)
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn agent(&self) -> &AgentLoop {
        &self.agent
    }

    /// Start a new request, cancelling any that is still active.
    pub fn begin(&mut self) -> RequestHandle {
        if let Some(previous) = self.active.take() {
            debug!("Cancelling previous request");
            previous.cancel();
        }
        let handle = RequestHandle::new();
        self.active = Some(handle.clone());
        handle
    }

    /// Cancel the active request, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            info!("Stopping active request");
            handle.cancel();
        }
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.plan_pending = false;
    }

    /// Send one message and run the loop to a terminal intent.
    ///
    /// On success the user turn and the final assistant turn are appended to
    /// history. On cancel or error history is unchanged.
    pub async fn send(
        &mut self,
        message: impl Into<UserMessage>,
        snapshot: &ProjectSnapshot,
        handle: &RequestHandle,
        events: &mpsc::Sender<AgentStreamEvent>,
    ) -> Result<LoopOutcome, AgentError> {
        let message = message.into();
        let mentions = extract_mentions(&message.text);
        let pinned = self.pin_mentions(&mentions, snapshot).await;

        let plan_mentioned = mentions.iter().any(|m| is_plan_file(m, &self.plan_file));
        let content = if is_approval(&message.text) && (plan_mentioned || self.plan_pending) {
            debug!("Plan approval detected");
            approval_hint(&message.text)
        } else {
            message.text.clone()
        };

        let context = ChatContext {
            tree: snapshot.tree.clone(),
            ignored: self.ai_ignored.clone(),
            pinned,
            active_file: snapshot
                .active_file
                .as_ref()
                .map(|path| PinnedFile::new(path.as_str(), snapshot.active_content())),
            selection: message.selection,
            tools: self.agent.tools().descriptions(),
        };

        let mut turns = Vec::with_capacity(self.conversation.len() + 2);
        turns.push(Turn::system(build_system_prompt(&context)));
        turns.extend(self.conversation.turns.iter().cloned());
        turns.push(Turn::user(content.clone()));

        let outcome = self.agent.run(&turns, handle, events).await?;

        self.conversation.push(Turn::user(content));
        self.conversation
            .push(Turn::assistant(outcome.raw_text.clone()));

        self.plan_pending = matches!(outcome.response, AgentResponse::Plan { .. });
        if let AgentResponse::Plan {
            summary,
            files_to_touch,
        } = &outcome.response
        {
            self.persist_plan(summary, files_to_touch, snapshot).await;
        }

        Ok(outcome)
    }

    /// Resolve `@mentions` to pinned files.
    ///
    /// Only paths the snapshot knows (loaded, in the tree, or active) can be
    /// pinned; unloaded ones are read from the store.
    async fn pin_mentions(&self, mentions: &[&str], snapshot: &ProjectSnapshot) -> Vec<PinnedFile> {
        let known = snapshot.known_paths();
        let active = snapshot.active_file.as_deref();
        let mut pinned: Vec<PinnedFile> = Vec::new();

        for mention in mentions {
            let Some(path) = resolve_target(mention, &known, active, None)
                .filter(|p| known.contains(&p.as_str()) || Some(p.as_str()) == active)
            else {
                debug!(mention = %mention, "Mention does not name a project file");
                continue;
            };
            if pinned.iter().any(|p| p.path == path) {
                continue;
            }

            let content = match snapshot.content(&path) {
                Some(content) => content.to_string(),
                None => match self.store.read(&path).await {
                    Ok(content) => content,
                    Err(e) => {
                        debug!(mention = %mention, error = %e, "Mention does not name a readable file");
                        continue;
                    }
                },
            };
            pinned.push(PinnedFile::new(path, content));
        }
        pinned
    }

    async fn persist_plan(&self, summary: &str, files: &[String], snapshot: &ProjectSnapshot) {
        if !self.persist_plans {
            return;
        }
        let Some(root) = snapshot.root() else {
            return;
        };

        let path = root.join(&self.plan_file).to_string_lossy().into_owned();
        match self
            .store
            .write(&path, &render_plan_markdown(summary, files))
            .await
        {
            Ok(()) => info!(path = %path, "Plan written"),
            Err(e) => warn!(path = %path, error = %e, "Failed to write plan"),
        }
    }
}
