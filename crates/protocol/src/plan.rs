//! Plan persistence format.

use std::fmt::Write;

/// Render an accepted plan as the markdown written to the plan file.
pub fn render_plan_markdown(summary: &str, files_to_touch: &[String]) -> String {
    let mut out = String::from("# Implementation Plan\n\n## Summary\n\n");
    out.push_str(summary.trim());
    out.push_str("\n\n## Files to touch\n\n");

    if files_to_touch.is_empty() {
        out.push_str("_No files listed._\n");
    } else {
        for file in files_to_touch {
            let _ = writeln!(out, "- [ ] `{file}`");
        }
    }
    out
}

/// Whether an edit path refers to the plan file (case-insensitive).
pub fn is_plan_file(path: &str, plan_file: &str) -> bool {
    !plan_file.is_empty() && path.to_lowercase().contains(&plan_file.to_lowercase())
}
