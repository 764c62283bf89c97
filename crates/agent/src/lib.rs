//! The agentic loop for Quill.
//!
//! A request follows a **Request → Stream → Classify** cycle:
//!
//! 1. **Build turns** (system prompt + history + the user message)
//! 2. **Stream** the model's answer, forwarding tokens as they arrive
//! 3. **Classify** the accumulated text into one intent
//! 4. **If tool call**: run the tool, append the exchange, loop back to step 2
//! 5. **Otherwise**: return the intent to the host
//!
//! There is no fixed depth limit on step 4. The caller owns a
//! [`RequestHandle`] and may cancel at any point; a cancelled request
//! commits nothing.

pub mod completion;
pub mod handle;
pub mod loop_runner;
pub mod session;
pub mod stream_event;

#[cfg(test)]
mod test_helpers;

pub use completion::{complete_inline, complete_with_config};
pub use handle::RequestHandle;
pub use loop_runner::{AgentError, AgentLoop, LoopOutcome};
pub use session::{ChatSession, UserMessage};
pub use stream_event::AgentStreamEvent;
