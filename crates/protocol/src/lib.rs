//! Agent response protocol for Quill.
//!
//! The model is instructed (through the system prompt built here) to answer
//! in exactly one of five shapes. This crate owns both halves of that
//! contract:
//!
//! ```text
//! ┌──────────────┐   prompt    ┌─────────┐   raw text   ┌────────────┐
//! │ ChatContext  │────────────▶│  model  │─────────────▶│ classify() │──▶ AgentResponse
//! └──────────────┘             └─────────┘              └────────────┘
//! ```
//!
//! - [`classify`] turns accumulated model text into an [`AgentResponse`]
//!   by trying JSON, then the `<edits>` wire format, then falling back to prose.
//! - [`prompt`] renders the system prompt and the project tree.
//! - [`framing`] wraps tool results and user hints as conversation turns.
//! - [`completion`] frames fill-in-the-middle prompts for inline completion.
//! - [`plan`] renders an accepted plan as a markdown artifact.
//!
//! [`AgentResponse`]: quill_core::AgentResponse

pub mod classifier;
pub mod completion;
pub mod framing;
pub mod plan;
pub mod prompt;

pub use classifier::classify;
pub use completion::{clean_suggestion, fim_prompt};
pub use framing::{approval_hint, frame_tool_result, is_approval, tool_notice};
pub use plan::{is_plan_file, render_plan_markdown};
pub use prompt::{
    ChatContext, PinnedFile, SelectedCode, build_system_prompt, extract_mentions,
    render_file_tree,
};
