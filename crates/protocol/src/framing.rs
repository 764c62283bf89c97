//! Conversation framing for tool results and user hints.

use quill_core::ToolName;

/// Wrap a tool's text result as the user turn fed back to the model.
pub fn frame_tool_result(tool: &ToolName, path: &str, result: &str) -> String {
    format!("<tool_result tool=\"{tool}\" path=\"{path}\">\n{result}\n</tool_result>")
}

/// The synthetic token streamed to the user while a tool runs.
pub fn tool_notice(path: &str) -> String {
    format!("\n```tool\n🔍 Reading `{path}`...\n```\n")
}

const APPROVAL_WORDS: [&str; 6] = ["ok", "execute", "approved", "تمام", "نفذ", "وافق"];

/// Whether a user message reads as approval of a pending plan.
pub fn is_approval(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| {
            let w = w.to_lowercase();
            APPROVAL_WORDS.contains(&w.as_str())
        })
}

/// Rewrite an approval so the model moves from planning to edits.
pub fn approval_hint(text: &str) -> String {
    format!(
        "[USER APPROVED PLAN] {text}\nNow please provide the high-precision edits for the code files as outlined in the plan."
    )
}
