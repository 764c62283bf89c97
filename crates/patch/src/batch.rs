//! Batch application: group by file, apply in order, write once.

use crate::engine;
use crate::resolve::resolve_target;
use quill_core::{Edit, FileStore, PatchError, ProjectSnapshot};
use std::io::ErrorKind;
use tracing::{debug, info, warn};

/// One edit that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFailure {
    pub edit_id: String,
    /// The path as the model wrote it.
    pub file: String,
    pub description: Option<String>,
    pub reason: PatchError,
}

impl EditFailure {
    fn new(edit: &Edit, reason: PatchError) -> Self {
        Self {
            edit_id: edit.id.clone(),
            file: edit.file.clone(),
            description: edit.description.clone(),
            reason,
        }
    }
}

/// What happened to one resolved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: String,
    /// Ids of edits applied to the buffer, in order.
    pub accepted: Vec<String>,
    /// Final buffer; only meaningful when `written` is true.
    pub content: String,
    pub written: bool,
}

/// The result of applying a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub failures: Vec<EditFailure>,
}

impl BatchReport {
    /// Ids of every edit that ended up on disk.
    pub fn accepted_ids(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.written)
            .flat_map(|f| f.accepted.iter().map(String::as_str))
            .collect()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.edit_id.as_str()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold written content back into the caller's snapshot.
    pub fn update_snapshot(&self, snapshot: &mut ProjectSnapshot) {
        for file in self.files.iter().filter(|f| f.written) {
            snapshot
                .contents
                .insert(file.path.clone(), file.content.clone());
        }
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.files.extend(other.files);
        self.failures.extend(other.failures);
    }

    /// The post-application message log shown to the user.
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .files
            .iter()
            .filter(|f| f.written)
            .map(|f| {
                let n = f.accepted.len();
                let plural = if n == 1 { "" } else { "s" };
                format!("Applied {n} edit{plural} to {}", f.path)
            })
            .collect();

        messages.extend(self.failures.iter().map(|f| match &f.description {
            Some(description) => format!(
                "Failed to apply edit \"{description}\" to {}: {}",
                f.file, f.reason
            ),
            None => format!("Failed to apply edit to {}: {}", f.file, f.reason),
        }));

        messages
    }
}

/// Applies a list of edits against a snapshot and persists through a store.
pub struct BatchApplier<'a> {
    snapshot: &'a ProjectSnapshot,
    store: &'a dyn FileStore,
}

impl<'a> BatchApplier<'a> {
    pub fn new(snapshot: &'a ProjectSnapshot, store: &'a dyn FileStore) -> Self {
        Self { snapshot, store }
    }

    /// Group edits by resolved path in first-appearance order.
    fn group<'e>(&self, edits: &'e [Edit]) -> (Vec<(String, Vec<&'e Edit>)>, Vec<EditFailure>) {
        let known = self.snapshot.known_paths();
        let active = self.snapshot.active_file.as_deref();
        let root = self.snapshot.root();

        let mut groups: Vec<(String, Vec<&Edit>)> = Vec::new();
        let mut failures = Vec::new();

        for edit in edits {
            let Some(path) = resolve_target(&edit.file, &known, active, root) else {
                warn!(file = %edit.file, "Could not resolve edit target");
                failures.push(EditFailure::new(
                    edit,
                    PatchError::Unresolvable {
                        file: edit.file.clone(),
                    },
                ));
                continue;
            };

            match groups.iter_mut().find(|(p, _)| *p == path) {
                Some((_, group)) => group.push(edit),
                None => groups.push((path, vec![edit])),
            }
        }

        (groups, failures)
    }

    /// Seed a buffer: loaded content, else the store, else a new file.
    async fn seed(&self, path: &str) -> Result<Option<String>, PatchError> {
        if let Some(content) = self.snapshot.content(path) {
            return Ok(Some(content.to_string()));
        }
        match self.store.read(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PatchError::ReadFailed {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Apply `edits`. Each file's edits run in order against one buffer and
    /// the buffer is written once if any of them succeeded.
    pub async fn apply(&self, edits: &[Edit]) -> BatchReport {
        let (groups, mut failures) = self.group(edits);
        let mut files = Vec::with_capacity(groups.len());

        for (path, group) in groups {
            let mut buffer = match self.seed(&path).await {
                Ok(buffer) => buffer,
                Err(reason) => {
                    warn!(path = %path, %reason, "Could not seed edit buffer");
                    failures.extend(group.iter().map(|e| EditFailure::new(e, reason.clone())));
                    continue;
                }
            };

            let mut accepted = Vec::new();
            for edit in group {
                match engine::apply(edit, buffer.as_deref()) {
                    Ok(next) => {
                        debug!(path = %path, edit_id = %edit.id, "Edit applied to buffer");
                        buffer = Some(next);
                        accepted.push(edit);
                    }
                    Err(reason) => {
                        warn!(path = %path, edit = edit.label(), %reason, "Edit failed");
                        failures.push(EditFailure::new(edit, reason));
                    }
                }
            }

            if accepted.is_empty() {
                continue;
            }

            let content = buffer.unwrap_or_default();
            let written = match self.store.write(&path, &content).await {
                Ok(()) => {
                    info!(path = %path, edits = accepted.len(), "File updated");
                    true
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Write failed");
                    let reason = PatchError::WriteFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    failures.extend(accepted.iter().map(|e| EditFailure::new(e, reason.clone())));
                    false
                }
            };

            files.push(FileOutcome {
                path,
                accepted: accepted.iter().map(|e| e.id.clone()).collect(),
                content,
                written,
            });
        }

        BatchReport { files, failures }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_core::InMemoryFileStore;
    use std::io;

    /// Store whose writes always fail.
    struct FailingStore;

    #[async_trait]
    impl FileStore for FailingStore {
        async fn read(&self, _path: &str) -> io::Result<String> {
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
        }
        async fn write(&self, _path: &str, _content: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn snapshot() -> ProjectSnapshot {
        ProjectSnapshot::new("/p")
            .with_file("/p/src/a.ts", "let a = 1;\nlet b = 2;\n")
            .with_file("/p/src/b.ts", "export {};\n")
    }

    #[tokio::test]
    async fn failure_is_isolated_and_file_written_once() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let first = Edit::replace("src/a.ts", "let a = 1;", "let a = 10;");
        // Targets text the first edit already changed.
        let second = Edit::replace("src/a.ts", "let a = 1;", "let a = 100;")
            .with_description("bump again");

        let report = applier.apply(&[first.clone(), second.clone()]).await;

        assert_eq!(store.writes(), vec!["/p/src/a.ts".to_string()]);
        assert_eq!(
            store.get("/p/src/a.ts").as_deref(),
            Some("let a = 10;\nlet b = 2;\n")
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].edit_id, second.id);
        assert_eq!(report.accepted_ids(), vec![first.id.as_str()]);
    }

    #[tokio::test]
    async fn later_edits_see_earlier_results() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let edits = [
            Edit::replace("a.ts", "let b = 2;", "let b = 2;\nlet c = 3;"),
            Edit::replace("a.ts", "let c = 3;", "let c = 30;"),
        ];
        let report = applier.apply(&edits).await;

        assert!(report.is_clean());
        assert_eq!(
            store.get("/p/src/a.ts").as_deref(),
            Some("let a = 1;\nlet b = 2;\nlet c = 30;\n")
        );
        assert_eq!(report.messages(), vec!["Applied 2 edits to /p/src/a.ts"]);
    }

    #[tokio::test]
    async fn failed_edit_leaves_buffer_for_next_edit() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let edits = [
            Edit::replace("a.ts", "does not exist", "x"),
            Edit::replace("a.ts", "let b = 2;", "let b = 20;"),
        ];
        let report = applier.apply(&edits).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            store.get("/p/src/a.ts").as_deref(),
            Some("let a = 1;\nlet b = 20;\n")
        );
    }

    #[tokio::test]
    async fn all_failed_means_no_write() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let report = applier
            .apply(&[Edit::replace("b.ts", "nope", "x")])
            .await;

        assert!(store.writes().is_empty());
        assert!(report.files.is_empty());
        assert_eq!(
            report.messages(),
            vec!["Failed to apply edit to b.ts: search text not found in b.ts"]
        );
    }

    #[tokio::test]
    async fn new_file_created_under_root() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let report = applier
            .apply(&[
                Edit::create("src/new.ts", "export const n = 1;"),
                Edit::replace("src/new.ts", "n = 1", "n = 2"),
            ])
            .await;

        assert!(report.is_clean());
        assert_eq!(
            store.get("/p/src/new.ts").as_deref(),
            Some("export const n = 2;")
        );
    }

    #[tokio::test]
    async fn one_new_file_named_two_ways_is_written_once() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let report = applier
            .apply(&[
                Edit::create("src/new.ts", "export const n = 1;\nexport const m = 2;\n"),
                Edit::replace("./src/new.ts", "n = 1", "n = 5"),
            ])
            .await;

        assert!(report.is_clean());
        assert_eq!(store.writes(), vec!["/p/src/new.ts".to_string()]);
        assert_eq!(
            store.get("/p/src/new.ts").as_deref(),
            Some("export const n = 5;\nexport const m = 2;\n")
        );
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].accepted.len(), 2);
    }

    #[tokio::test]
    async fn unloaded_file_is_seeded_from_store() {
        let snapshot = ProjectSnapshot::new("/p");
        let store = InMemoryFileStore::new().with_file("/p/lib.rs", "fn a() {}\n");
        let applier = BatchApplier::new(&snapshot, &store);

        let report = applier
            .apply(&[Edit::replace("lib.rs", "fn a() {}", "fn b() {}")])
            .await;

        assert!(report.is_clean());
        assert_eq!(store.get("/p/lib.rs").as_deref(), Some("fn b() {}\n"));
    }

    #[tokio::test]
    async fn groups_are_written_in_first_appearance_order() {
        let snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        applier
            .apply(&[
                Edit::replace("b.ts", "export {};", "export const b = 1;"),
                Edit::replace("a.ts", "let a = 1;", "let a = 2;"),
                Edit::replace("b.ts", "b = 1", "b = 2"),
            ])
            .await;

        assert_eq!(
            store.writes(),
            vec!["/p/src/b.ts".to_string(), "/p/src/a.ts".to_string()]
        );
        assert_eq!(
            store.get("/p/src/b.ts").as_deref(),
            Some("export const b = 2;\n")
        );
    }

    #[tokio::test]
    async fn unresolvable_without_root() {
        let snapshot = ProjectSnapshot::default();
        let store = InMemoryFileStore::new();
        let applier = BatchApplier::new(&snapshot, &store);

        let report = applier.apply(&[Edit::create("new.ts", "x")]).await;
        assert_eq!(
            report.failures[0].reason,
            PatchError::Unresolvable {
                file: "new.ts".into()
            }
        );
    }

    #[tokio::test]
    async fn write_failure_fails_accepted_edits() {
        let snapshot = snapshot();
        let applier = BatchApplier::new(&snapshot, &FailingStore);

        let edit = Edit::replace("a.ts", "let a = 1;", "let a = 2;");
        let report = applier.apply(std::slice::from_ref(&edit)).await;

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].reason,
            PatchError::WriteFailed { .. }
        ));
        assert!(report.accepted_ids().is_empty());
    }

    #[tokio::test]
    async fn report_updates_snapshot() {
        let mut snapshot = snapshot();
        let store = InMemoryFileStore::new();
        let report = BatchApplier::new(&snapshot, &store)
            .apply(&[Edit::replace("a.ts", "let a = 1;", "let a = 5;")])
            .await;

        report.update_snapshot(&mut snapshot);
        assert_eq!(
            snapshot.content("/p/src/a.ts"),
            Some("let a = 5;\nlet b = 2;\n")
        );
    }
}
