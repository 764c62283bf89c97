//! `quill parse`: Print the classified intent of a saved response.

use quill_protocol::classify;
use std::path::PathBuf;

pub async fn run(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let response = classify(&raw);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
