//! # Quill Core
//!
//! Domain types, traits, and error definitions for the Quill editor agent.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the agent talks to (the inference server, the tool set,
//! the filesystem) is a trait here. Implementations live in their respective
//! crates. This enables:
//! - Swapping the transport or file store in tests
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod project;
pub mod provider;
pub mod response;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{PatchError, ProviderError, ToolError};
pub use message::{Conversation, ConversationId, Role, Turn};
pub use project::{FileNode, ProjectSnapshot, normalize_lexically};
pub use provider::{
    ChatRequest, ChunkReceiver, GenerateOptions, GenerateRequest, Provider, StreamChunk,
};
pub use response::{AgentResponse, Edit, EditAction, ToolName};
pub use store::{FileStore, InMemoryFileStore};
pub use tool::{Tool, ToolRegistry, ToolResult};
