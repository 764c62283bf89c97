pub mod apply;
pub mod chat;
pub mod complete;
pub mod init;
pub mod models;
pub mod parse;
pub mod status;

use quill_config::AppConfig;
use std::path::PathBuf;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

/// The project folder: the given one, else the current directory.
pub(crate) fn project_root(project: Option<PathBuf>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let root = match project {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(format!("Not a directory: {}", root.display()).into());
    }
    Ok(root.canonicalize()?)
}
