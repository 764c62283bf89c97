//! Terminal rendering of intents and patch reports.

use quill_core::AgentResponse;
use quill_patch::BatchReport;

/// Print the structured part of a terminal intent. Prose was already streamed.
pub fn print_response(response: &AgentResponse) {
    match response {
        AgentResponse::Questions { questions } => {
            println!("\n  ❓ Questions:");
            for (i, q) in questions.iter().enumerate() {
                println!("    {}. {q}", i + 1);
            }
        }
        AgentResponse::Plan {
            summary,
            files_to_touch,
        } => {
            println!("\n  📋 Plan: {summary}");
            for file in files_to_touch {
                println!("    - {file}");
            }
            println!("  Reply \"ok\" to execute.");
        }
        AgentResponse::Edits { summary, edits } => {
            if !summary.is_empty() {
                println!("\n  ✏️  {summary}");
            }
            for edit in edits {
                println!("    [{:?}] {} — {}", edit.action, edit.file, edit.label());
            }
        }
        AgentResponse::ToolCall { tool, path } => {
            println!("\n  🔧 {tool} {path}");
        }
        AgentResponse::Prose { .. } => println!(),
    }
}

pub fn print_report(report: &BatchReport) {
    for message in report.messages() {
        let mark = if message.starts_with("Applied") { "✅" } else { "❌" };
        println!("  {mark} {message}");
    }
}
