//! Response classification.
//!
//! An ordered list of parse attempts, first hit wins:
//!
//! 1. JSON intent: the first fenced block (tag optional), else the span from
//!    the first `{` to the last `}`. Only `questions`, `plan` and `tool_call`
//!    are accepted.
//! 2. The `<edits>` wire format with SEARCH/REPLACE blocks.
//! 3. Prose: the raw text, unmodified.
//!
//! Nothing here fails. Text that matches no structure is prose.

use quill_core::{AgentResponse, Edit, EditAction};
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?\s*([\s\S]*?)```").expect("json fence regex is valid")
});

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("json object regex is valid"));

static EDITS_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<edits((?:\s+[\w-]+\s*=\s*"[^"]*")*)\s*>([\s\S]*?)</edits>"#)
        .expect("edits block regex is valid")
});

/// `<edit ...>body</edit>` or a self-closing `<edit ... />`.
static EDIT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<edit((?:\s+[\w-]+\s*=\s*"[^"]*")*)\s*(?:/>|>([\s\S]*?)</edit>)"#)
        .expect("edit tag regex is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*"([^"]*)""#).expect("attribute regex is valid")
});

static SEARCH_REPLACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<{3,}\s*SEARCH\s*([\s\S]*?)\s*={3,}\s*REPLACE\s*([\s\S]*?)\s*>{3,}\s*(?:END|REPLACE)",
    )
    .expect("search/replace regex is valid")
});

/// Classify the fully accumulated text of one model turn.
pub fn classify(raw: &str) -> AgentResponse {
    let text = raw.trim();

    let response = parse_json_intent(text)
        .or_else(|| parse_edits(text))
        .unwrap_or_else(|| AgentResponse::Prose {
            text: raw.to_string(),
        });

    debug!(kind = response.kind(), "Classified model response");
    response
}

fn json_candidate(text: &str) -> Option<&str> {
    if let Some(caps) = JSON_FENCE.captures(text) {
        return caps.get(1).map(|m| m.as_str());
    }
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

fn parse_json_intent(text: &str) -> Option<AgentResponse> {
    let candidate = json_candidate(text)?;
    let mut value: serde_json::Value = serde_json::from_str(candidate.trim()).ok()?;

    let kind = value.get("type")?.as_str()?;
    if !matches!(kind, "questions" | "plan" | "tool_call") {
        debug!(kind, "Ignoring JSON with unsupported type");
        return None;
    }

    if kind == "plan"
        && let Some(object) = value.as_object_mut()
    {
        let snake = object.remove("files_to_touch").filter(|v| !v.is_null());
        let camel = object.remove("filesToTouch").filter(|v| !v.is_null());
        let files = snake
            .or(camel)
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
        object.insert("filesToTouch".into(), files);
    }

    serde_json::from_value(value)
        .inspect_err(|e| debug!(error = %e, "JSON intent has the wrong shape"))
        .ok()
}

fn parse_edits(text: &str) -> Option<AgentResponse> {
    let block = EDITS_BLOCK.captures(text)?;
    let attributes = parse_attributes(block.get(1).map_or("", |m| m.as_str()));
    let body = block.get(2).map_or("", |m| m.as_str());

    let summary = attributes.get("summary").cloned().unwrap_or_default();

    let edits: Vec<Edit> = EDIT_TAG
        .captures_iter(body)
        .filter_map(|caps| {
            parse_edit(
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
            )
        })
        .collect();

    debug!(count = edits.len(), "Parsed edits block");
    Some(AgentResponse::Edits { summary, edits })
}

fn parse_edit(attributes: &str, body: &str) -> Option<Edit> {
    let attributes = parse_attributes(attributes);

    let Some(file) = attributes
        .get("file")
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
    else {
        warn!("Skipping edit without a file attribute");
        return None;
    };

    let raw_action = attributes.get("action").map(String::as_str).unwrap_or("");
    let Some(action) = EditAction::parse(raw_action) else {
        warn!(file, action = raw_action, "Skipping edit with unknown action");
        return None;
    };

    let body = body.trim();
    let edit = match action {
        EditAction::Create => Edit::create(file, body),
        _ => match SEARCH_REPLACE.captures(body) {
            Some(sr) => Edit::replace(
                file,
                sr.get(1).map_or("", |m| m.as_str()).trim(),
                sr.get(2).map_or("", |m| m.as_str()).trim(),
            ),
            None if action == EditAction::Delete => Edit::delete(file),
            None => Edit::rewrite(file, body),
        },
    };

    let description = attributes.get("description").cloned().unwrap_or_default();
    Some(edit.with_description(description))
}

/// Attribute names are matched exactly; order is free.
fn parse_attributes(text: &str) -> HashMap<String, String> {
    ATTRIBUTE
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_string();
            let value = unescape(caps.get(2)?.as_str());
            Some((name, value))
        })
        .collect()
}

fn unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
