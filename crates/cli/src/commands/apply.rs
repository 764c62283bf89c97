//! `quill apply`: Apply the edits in a saved model response.

use crate::dry_run::DryRunStore;
use crate::render::print_report;
use quill_core::{AgentResponse, FileStore};
use quill_patch::BatchApplier;
use quill_protocol::classify;
use quill_tools::{LocalFileStore, load_project};
use std::path::PathBuf;

pub async fn run(
    file: PathBuf,
    project: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let root = super::project_root(project)?;

    let raw = tokio::fs::read_to_string(&file)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;

    let AgentResponse::Edits { summary, edits } = classify(&raw) else {
        return Err(format!("{} does not contain an <edits> block", file.display()).into());
    };
    if !summary.is_empty() {
        println!("  {summary}");
    }

    let snapshot = load_project(
        root.clone(),
        config.workspace.ai_ignored.clone(),
        config.workspace.max_tree_depth,
    )
    .await?;
    let disk = LocalFileStore::new(Some(root));

    if dry_run {
        let store = DryRunStore::new(disk);
        let report = BatchApplier::new(&snapshot, &store).apply(&edits).await;
        print_report(&report);
        for path in store.writes() {
            println!("  (dry run) would write {path}");
        }
        return Ok(());
    }

    let store: &dyn FileStore = &disk;
    let report = BatchApplier::new(&snapshot, store).apply(&edits).await;
    print_report(&report);

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} edit(s) failed", report.failures.len()).into())
    }
}
