//! Configuration loading, validation, and management for Quill.
//!
//! Loads configuration from `~/.quill/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use quill_core::provider::GenerateOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.quill/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default model for chat and completion
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Inference server connection
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Inline completion sampling
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Agent loop behaviour
    #[serde(default)]
    pub agent: AgentConfig,

    /// Project handling
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_model() -> String {
    "qwen3-coder:480b-cloud".into()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connect timeout. Chat streams themselves never time out.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_connect_timeout() -> u64 {
    10
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
}

fn default_num_predict() -> u32 {
    128
}
fn default_stop() -> Vec<String> {
    vec![
        "<|file_separator|>".into(),
        "<|fim_prefix|>".into(),
        "<|fim_suffix|>".into(),
        "<|fim_middle|>".into(),
        "\n\n".into(),
    ]
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            num_predict: default_num_predict(),
            temperature: 0.0,
            stop: default_stop(),
        }
    }
}

impl CompletionConfig {
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            num_predict: self.num_predict,
            temperature: self.temperature,
            stop: self.stop.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Cap on consecutive tool calls per request. Unset = unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tool_rounds: Option<u32>,

    /// Deny tool reads that resolve outside the project root.
    #[serde(default)]
    pub restrict_tools_to_project: bool,

    /// Write accepted plans to the plan file in the project root.
    #[serde(default = "default_true")]
    pub persist_plans: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Markdown artifact that plan responses are written to
    #[serde(default = "default_plan_file")]
    pub plan_file: String,

    /// Names excluded from the file tree shown to the model
    #[serde(default = "default_ai_ignored")]
    pub ai_ignored: Vec<String>,

    /// Depth limit when scanning the project tree
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
}

fn default_plan_file() -> String {
    "implementation_plan.md".into()
}
fn default_ai_ignored() -> Vec<String> {
    [
        "node_modules",
        "dist",
        "dist-electron",
        ".next",
        "__pycache__",
        ".cache",
        "build",
        "coverage",
        ".venv",
        "venv",
        ".git",
        ".DS_Store",
        "Thumbs.db",
        "target",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_max_tree_depth() -> usize {
    6
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            plan_file: default_plan_file(),
            ai_ignored: default_ai_ignored(),
            max_tree_depth: default_max_tree_depth(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.quill/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `OLLAMA_HOST`: inference server base URL
    /// - `QUILL_MODEL`: default model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.ollama.base_url = normalize_host(&host);
        }

        if let Ok(model) = std::env::var("QUILL_MODEL") {
            config.default_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".quill")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ollama.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ollama.base_url must not be empty".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::ValidationError(
                "completion.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.workspace.plan_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "workspace.plan_file must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            ollama: OllamaConfig::default(),
            completion: CompletionConfig::default(),
            agent: AgentConfig {
                max_tool_rounds: None,
                restrict_tools_to_project: false,
                persist_plans: true,
            },
            workspace: WorkspaceConfig::default(),
        }
    }
}

/// `OLLAMA_HOST` is often given as `host:port` without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
