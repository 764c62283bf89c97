//! Classified model intents and the edits they carry.
//!
//! A model turn is interpreted as exactly one [`AgentResponse`]. Structured
//! variants serialize with a snake_case `type` tag, which is also the shape
//! recorded in the conversation when the loop logs a tool call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The read-only tools the model may request mid-loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolName {
    ReadFile,
    ListDirectory,
    /// A name the model made up. Kept so the executor can answer it as text.
    Unknown(String),
}

impl ToolName {
    pub fn as_str(&self) -> &str {
        match self {
            ToolName::ReadFile => "read_file",
            ToolName::ListDirectory => "list_directory",
            ToolName::Unknown(name) => name,
        }
    }
}

impl Default for ToolName {
    fn default() -> Self {
        ToolName::Unknown(String::new())
    }
}

impl From<String> for ToolName {
    fn from(name: String) -> Self {
        match name.as_str() {
            "read_file" => ToolName::ReadFile,
            "list_directory" => ToolName::ListDirectory,
            _ => ToolName::Unknown(name),
        }
    }
}

impl From<&str> for ToolName {
    fn from(name: &str) -> Self {
        ToolName::from(name.to_string())
    }
}

impl From<ToolName> for String {
    fn from(tool: ToolName) -> Self {
        tool.as_str().to_string()
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an edit does to its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Create,
    Delete,
    Replace,
}

impl EditAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_ascii_lowercase().as_str() {
            "create" => Some(EditAction::Create),
            "delete" => Some(EditAction::Delete),
            "replace" => Some(EditAction::Replace),
            _ => None,
        }
    }
}

/// One proposed mutation of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Assigned when the edit is produced; never supplied by the model.
    pub id: String,

    /// Path as referenced by the model. Not necessarily absolute or known.
    pub file: String,

    pub action: EditAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Text expected to exist (near-)verbatim in the target (`replace`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Substitute for `search` (`replace`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,

    /// Full file body (`create`, or a `replace` without a SEARCH block).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Edit {
    fn new(file: impl Into<String>, action: EditAction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file: file.into(),
            action,
            description: None,
            search: None,
            replace: None,
            content: None,
        }
    }

    pub fn create(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(file, EditAction::Create)
        }
    }

    pub fn delete(file: impl Into<String>) -> Self {
        Self::new(file, EditAction::Delete)
    }

    pub fn replace(
        file: impl Into<String>,
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self {
        Self {
            search: Some(search.into()),
            replace: Some(replace.into()),
            ..Self::new(file, EditAction::Replace)
        }
    }

    /// A `replace` whose body carried no SEARCH/REPLACE block.
    pub fn rewrite(file: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::new(file, EditAction::Replace)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    /// Short label for user-facing messages.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.file)
    }
}

/// The classified purpose of one model turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentResponse {
    /// Clarifying questions for the user.
    Questions {
        #[serde(default)]
        questions: Vec<String>,
    },

    /// A proposal awaiting user approval.
    Plan {
        #[serde(default)]
        summary: String,
        #[serde(rename = "filesToTouch", default)]
        files_to_touch: Vec<String>,
    },

    /// A read-only inspection request.
    ToolCall {
        #[serde(default)]
        tool: ToolName,
        #[serde(default)]
        path: String,
    },

    /// Proposed code changes.
    Edits {
        #[serde(default)]
        summary: String,
        #[serde(default)]
        edits: Vec<Edit>,
    },

    /// Plain text with no structured intent. Carries the raw text unmodified.
    Prose { text: String },
}

impl AgentResponse {
    /// The `type` tag of this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Questions { .. } => "questions",
            Self::Plan { .. } => "plan",
            Self::ToolCall { .. } => "tool_call",
            Self::Edits { .. } => "edits",
            Self::Prose { .. } => "prose",
        }
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, Self::ToolCall { .. })
    }
}
