//! The pending set an interactive host reviews edits from.
//!
//! Every received edit ends in exactly one of accepted, rejected or failed.
//! Edits aimed at the plan file skip review and are applied on arrival.

use crate::batch::{BatchApplier, BatchReport, EditFailure};
use quill_core::{Edit, FileStore, ProjectSnapshot};
use quill_protocol::is_plan_file;
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct EditReview {
    plan_file: String,
    pending: Vec<Edit>,
    accepted: Vec<String>,
    rejected: Vec<String>,
    failures: Vec<EditFailure>,
}

impl EditReview {
    pub fn new(plan_file: impl Into<String>) -> Self {
        Self {
            plan_file: plan_file.into(),
            ..Self::default()
        }
    }

    pub fn pending(&self) -> &[Edit] {
        &self.pending
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn failures(&self) -> &[EditFailure] {
        &self.failures
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue a new batch. Plan-file edits are applied right away and the
    /// report for them is returned.
    pub async fn receive(
        &mut self,
        edits: Vec<Edit>,
        snapshot: &mut ProjectSnapshot,
        store: &dyn FileStore,
    ) -> BatchReport {
        let (plan, rest): (Vec<Edit>, Vec<Edit>) = edits
            .into_iter()
            .partition(|e| is_plan_file(&e.file, &self.plan_file));

        debug!(queued = rest.len(), plan = plan.len(), "Edits received for review");
        self.pending.extend(rest);

        if plan.is_empty() {
            return BatchReport::default();
        }
        self.commit(&plan, snapshot, store).await
    }

    /// Apply one pending edit. `None` when `id` is not pending.
    pub async fn accept(
        &mut self,
        id: &str,
        snapshot: &mut ProjectSnapshot,
        store: &dyn FileStore,
    ) -> Option<BatchReport> {
        let edit = self.take(id)?;
        Some(self.commit(std::slice::from_ref(&edit), snapshot, store).await)
    }

    /// Drop one pending edit without applying it.
    pub fn reject(&mut self, id: &str) -> Option<Edit> {
        let edit = self.take(id)?;
        self.rejected.push(edit.id.clone());
        Some(edit)
    }

    /// Apply every pending edit as one batch.
    pub async fn accept_all(
        &mut self,
        snapshot: &mut ProjectSnapshot,
        store: &dyn FileStore,
    ) -> BatchReport {
        let edits = std::mem::take(&mut self.pending);
        self.commit(&edits, snapshot, store).await
    }

    pub fn reject_all(&mut self) -> Vec<Edit> {
        let edits = std::mem::take(&mut self.pending);
        self.rejected.extend(edits.iter().map(|e| e.id.clone()));
        edits
    }

    fn take(&mut self, id: &str) -> Option<Edit> {
        let index = self.pending.iter().position(|e| e.id == id)?;
        Some(self.pending.remove(index))
    }

    async fn commit(
        &mut self,
        edits: &[Edit],
        snapshot: &mut ProjectSnapshot,
        store: &dyn FileStore,
    ) -> BatchReport {
        let report = BatchApplier::new(snapshot, store).apply(edits).await;
        report.update_snapshot(snapshot);

        self.accepted
            .extend(report.accepted_ids().into_iter().map(str::to_string));
        self.failures.extend(report.failures.iter().cloned());
        info!(
            accepted = report.accepted_ids().len(),
            failed = report.failures.len(),
            "Edits committed"
        );
        report
    }
}
