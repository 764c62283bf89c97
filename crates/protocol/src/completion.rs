//! Fill-in-the-middle framing for inline completion.

pub const FIM_PREFIX: &str = "<|fim_prefix|>";
pub const FIM_SUFFIX: &str = "<|fim_suffix|>";
pub const FIM_MIDDLE: &str = "<|fim_middle|>";

/// Frame the text around the cursor for a FIM-capable coder model.
pub fn fim_prompt(prefix: &str, suffix: &str) -> String {
    format!("{FIM_PREFIX}{prefix}{FIM_SUFFIX}{suffix}{FIM_MIDDLE}")
}

/// Strip markdown fences a chatty model wraps around a suggestion.
pub fn clean_suggestion(raw: &str) -> String {
    let mut text = raw;

    if let Some(rest) = text.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if let Some(body) = rest[tag_len..].strip_prefix('\n') {
            text = body;
        }
    }

    while let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_layout() {
        assert_eq!(
            fim_prompt("let x = ", ";\n"),
            "<|fim_prefix|>let x = <|fim_suffix|>;\n<|fim_middle|>"
        );
    }

    #[test]
    fn fenced_suggestion_is_unwrapped() {
        assert_eq!(clean_suggestion("```typescript\nx + 1\n```"), "x + 1");
        assert_eq!(clean_suggestion("```\nfoo()```"), "foo()");
    }

    #[test]
    fn plain_suggestion_is_trimmed() {
        assert_eq!(clean_suggestion("  a + b \n"), "a + b");
    }

    #[test]
    fn inline_backticks_are_kept() {
        assert_eq!(clean_suggestion("```rust fn"), "```rust fn");
    }
}
