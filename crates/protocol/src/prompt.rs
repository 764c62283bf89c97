//! System prompt construction.
//!
//! The prompt teaches the model the response protocol that
//! [`classify`](crate::classify) parses, and embeds the project context: the
//! file tree, pinned files, the active file and an optional selection.

use quill_core::FileNode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Write;

/// A file whose full content is included in the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedFile {
    pub path: String,
    pub content: String,
}

impl PinnedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A line range the user highlighted in the active file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCode {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Everything the system prompt is rendered from.
#[derive(Debug, Clone, Default)]
pub struct ChatContext {
    pub tree: Vec<FileNode>,
    /// Directory names hidden from the rendered tree.
    pub ignored: Vec<String>,
    pub pinned: Vec<PinnedFile>,
    pub active_file: Option<PinnedFile>,
    pub selection: Option<SelectedCode>,
    /// `(name, description)` of the tools the model may call.
    pub tools: Vec<(String, String)>,
}

const DEFAULT_TOOLS: [(&str, &str); 2] = [
    ("read_file", "Read the content of a file you need to inspect."),
    ("list_directory", "List files/folders inside a path."),
];

const PROTOCOL: &str = r#"---
## RESPONSE PROTOCOL: output exactly ONE of these formats per response.

### 1. QUESTIONS
```json
{ "type": "questions", "questions": ["Question 1?", "Question 2?"] }
```

### 2. PLAN
```json
{ "type": "plan", "summary": "What you intend to do and why", "files_to_touch": ["src/App.tsx"] }
```
Proceed after the user says "OK" or "execute".

### 3. TOOL CALL
```json
{ "type": "tool_call", "tool": "read_file", "path": "src/App.tsx" }
```

### 4. EDITS (SEARCH/REPLACE)
```xml
<edits summary="Brief summary">
<edit file="src/App.tsx" action="replace" description="Fix login handler">
<<<< SEARCH
exact existing code
==== REPLACE
new replacement code
>>>> END
</edit>
</edits>
```
Rules: exact SEARCH text, include 2-3 context lines, never truncate, no line numbers.
Use action="create" with the full file body to add a file, action="delete" to remove one.

### 5. PLAIN TEXT
Just write normal text for explanations or status updates.

---
## WORKFLOW
1. Simple (< 5 lines, 1 file): go straight to EDITS.
2. Complex (multi-file, architecture): Questions, then Plan, then Edits.
3. Need to inspect a file first: TOOL CALL, then EDITS.
"#;

/// Render the project tree as indented text, hiding ignored directories.
pub fn render_file_tree(nodes: &[FileNode], ignored: &[String]) -> String {
    let ignored: HashSet<&str> = ignored.iter().map(String::as_str).collect();
    let mut out = String::new();
    render_nodes(nodes, &ignored, "", &mut out);
    out
}

fn render_nodes(nodes: &[FileNode], ignored: &HashSet<&str>, indent: &str, out: &mut String) {
    for node in nodes {
        if node.is_dir && ignored.contains(node.name.as_str()) {
            continue;
        }
        let icon = if node.is_dir { "📁" } else { "📄" };
        let _ = writeln!(out, "{indent}{icon} {}", node.name);
        if let Some(children) = &node.children {
            render_nodes(children, ignored, &format!("{indent}  "), out);
        }
    }
}

/// Build the system prompt for one request.
pub fn build_system_prompt(ctx: &ChatContext) -> String {
    let mut prompt = String::from(
        "You are an expert AI code editor embedded in a desktop IDE. You are an AGENT: \
         think before acting, ask clarifying questions, propose plans, and execute changes precisely.\n\n",
    );

    prompt.push_str("---\n## TOOLS AVAILABLE\n");
    if ctx.tools.is_empty() {
        for (name, description) in DEFAULT_TOOLS {
            let _ = writeln!(prompt, "- **{name}**: {description}");
        }
    } else {
        for (name, description) in &ctx.tools {
            let _ = writeln!(prompt, "- **{name}**: {description}");
        }
    }
    prompt.push('\n');
    prompt.push_str(PROTOCOL);

    prompt.push_str("\n---\n## CONTEXT\n<project_file_tree>\n");
    prompt.push_str(&render_file_tree(&ctx.tree, &ctx.ignored));
    prompt.push_str("</project_file_tree>\n");

    if !ctx.pinned.is_empty() {
        prompt.push_str("\n<pinned_files>\n");
        for file in &ctx.pinned {
            let _ = writeln!(
                prompt,
                "<pinned_file path=\"{}\">\n{}\n</pinned_file>",
                file.path, file.content
            );
        }
        prompt.push_str("</pinned_files>\n");
    }

    let (active_path, active_content) = ctx
        .active_file
        .as_ref()
        .map_or(("", ""), |f| (f.path.as_str(), f.content.as_str()));
    let _ = write!(
        prompt,
        "\n<active_file path=\"{active_path}\">\n{active_content}\n</active_file>"
    );

    if let Some(selection) = &ctx.selection {
        let _ = write!(
            prompt,
            "\n<selected_code line_start=\"{}\" line_end=\"{}\">\n{}\n</selected_code>",
            selection.start_line, selection.end_line, selection.content
        );
    }

    prompt
}

/// `@path` mentions in a user message, without the `@`.
pub fn extract_mentions(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter_map(|word| word.strip_prefix('@'))
        .filter(|tag| !tag.is_empty())
        .collect()
}
