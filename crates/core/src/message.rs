//! Turn and Conversation domain types.
//!
//! These are the value objects sent to the inference server:
//! the host builds a conversation → the agent loop extends a working copy
//! with tool calls and results → the provider serializes `{role, content}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (chat session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (response protocol, project context)
    System,
    /// The end user, or a synthetic tool-result turn
    User,
    /// The model
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in the model conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation is an ordered, append-only sequence of turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Ordered turns
    pub turns: Vec<Turn>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last turn was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn.
    pub fn push(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop all turns, keeping the id.
    pub fn clear(&mut self) {
        self.updated_at = Utc::now();
        self.turns.clear();
    }

    /// Get the total token count estimate (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.turns.iter().map(|t| t.content.len() / 4).sum()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_as_role_and_content() {
        let json = serde_json::to_string(&Turn::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn conversation_tracks_updates() {
        let mut conv = Conversation::new();
        let created = conv.created_at;

        conv.push(Turn::user("First message"));
        assert_eq!(conv.len(), 1);
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn clear_keeps_id() {
        let mut conv = Conversation::new();
        let id = conv.id.clone();
        conv.push(Turn::user("x"));
        conv.clear();
        assert!(conv.is_empty());
        assert_eq!(conv.id, id);
    }

    #[test]
    fn conversation_token_estimate() {
        let mut conv = Conversation::new();
        // 20 chars ≈ 5 tokens
        conv.push(Turn::user("12345678901234567890"));
        assert_eq!(conv.estimated_tokens(), 5);
    }
}
