//! End-to-end integration tests for the Quill agent pipeline.
//!
//! These tests exercise the path from a user message to files on disk:
//! streaming, classification, tool execution, and batch patch application.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use quill_agent::{AgentError, AgentLoop, AgentStreamEvent, ChatSession, RequestHandle};
use quill_core::{
    AgentResponse, ChatRequest, ChunkReceiver, FileStore, Provider, ProviderError, StreamChunk,
};
use quill_patch::{BatchApplier, EditReview};
use quill_protocol::classify;
use quill_tools::{LocalFileStore, ToolExecutor, ToolScope, scan_project};
use tokio::sync::mpsc;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that streams scripted responses in sequence, a few
/// characters per chunk.
struct ScriptedProvider {
    responses: Mutex<Vec<String>>,
    calls: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> Result<ChunkReceiver, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let responses = self.responses.lock().unwrap();
        let Some(text) = responses.get(*calls).cloned() else {
            panic!("ScriptedProvider exhausted: call #{}", *calls);
        };
        *calls += 1;

        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let chars: Vec<char> = text.chars().collect();
            for piece in chars.chunks(7) {
                let piece: String = piece.iter().collect();
                if tx.send(Ok(StreamChunk::token(piece))).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(Ok(StreamChunk::done())).await;
        });
        Ok(rx)
    }
}

/// A provider that never finishes its stream.
struct StallingProvider;

#[async_trait::async_trait]
impl Provider for StallingProvider {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn stream_chat(&self, _request: ChatRequest) -> Result<ChunkReceiver, ProviderError> {
        let (tx, rx) = mpsc::channel(4);
        tokio::spawn(async move {
            let _ = tx.send(Ok(StreamChunk::token("working on it"))).await;
            tx.closed().await;
        });
        Ok(rx)
    }
}

fn agent(provider: Arc<dyn Provider>, root: &std::path::Path) -> AgentLoop {
    let tools = Arc::new(ToolExecutor::new(ToolScope::new(Some(root.to_path_buf()))));
    AgentLoop::new(provider, tools, "test-model")
}

const RENAME_EDITS: &str = r#"I'll rename it.
<edits summary="Rename foo to bar">
<edit file="src/lib.ts" action="replace" description="rename function">
<<<< SEARCH
function foo() {}
==== REPLACE
function bar() {}
>>>> END
</edit>
<edit file="src/lib.ts" action="replace" description="rename call">
<<<< SEARCH
foo();
==== REPLACE
bar();
>>>> END
</edit>
</edits>"#;

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_read_then_edit_then_apply_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/lib.ts"), "function foo() {}\nfoo();\n").unwrap();

    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"type":"tool_call","tool":"read_file","path":"src/lib.ts"}"#,
        RENAME_EDITS,
    ]));
    let agent = agent(provider.clone(), dir.path());
    let (tx, mut rx) = mpsc::channel(256);

    let outcome = agent
        .run(
            &[quill_core::Turn::user("rename foo to bar")],
            &RequestHandle::new(),
            &tx,
        )
        .await
        .unwrap();
    drop(tx);

    assert_eq!(provider.calls(), 2);
    assert_eq!(outcome.tool_calls_made, 1);
    let AgentResponse::Edits { summary, edits } = outcome.response else {
        panic!("expected edits");
    };
    assert_eq!(summary, "Rename foo to bar");
    assert_eq!(edits.len(), 2);

    let mut dones = 0;
    while let Some(event) = rx.recv().await {
        if matches!(event, AgentStreamEvent::Done { .. }) {
            dones += 1;
        }
    }
    assert_eq!(dones, 1);

    let snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let store = LocalFileStore::new(Some(dir.path().to_path_buf()));
    let report = BatchApplier::new(&snapshot, &store).apply(&edits).await;

    assert!(report.is_clean(), "{:?}", report.messages());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("src/lib.ts")).unwrap(),
        "function bar() {}\nbar();\n"
    );
}

#[tokio::test]
async fn e2e_saved_response_with_reindented_search() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.py");
    std::fs::write(&path, "import os\nx = 1\nprint(x)\n").unwrap();

    let raw = "<edits>\n<edit file=\"app.py\" action=\"replace\">\n<<<<<<< SEARCH\n    x = 1\n    print(x)\n=======  REPLACE\nprint(1)\n>>>>>>> REPLACE\n</edit>\n</edits>";
    let AgentResponse::Edits { edits, .. } = classify(raw) else {
        panic!("expected edits");
    };

    let snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let store = LocalFileStore::new(Some(dir.path().to_path_buf()));
    let report = BatchApplier::new(&snapshot, &store).apply(&edits).await;

    assert!(report.is_clean(), "{:?}", report.messages());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "import os\nprint(1)\n");
}

#[tokio::test]
async fn e2e_bare_file_name_resolves_through_scanned_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    let app = dir.path().join("src/App.tsx");
    std::fs::write(&app, "export const title = 'old';\nexport default App;\n").unwrap();

    let raw = r#"<edits>
<edit file="App.tsx" action="replace"><<<< SEARCH
export const title = 'old';
==== REPLACE
export const title = 'new';
>>>> END</edit>
</edits>"#;
    let AgentResponse::Edits { edits, .. } = classify(raw) else {
        panic!("expected edits");
    };

    let snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let store = LocalFileStore::new(Some(dir.path().to_path_buf()));
    let report = BatchApplier::new(&snapshot, &store).apply(&edits).await;

    assert!(report.is_clean(), "{:?}", report.messages());
    assert_eq!(
        std::fs::read_to_string(&app).unwrap(),
        "export const title = 'new';\nexport default App;\n"
    );
    assert!(!dir.path().join("App.tsx").exists());
}

#[tokio::test]
async fn e2e_partial_failure_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.ts"), "let a = 1;\n").unwrap();
    std::fs::write(dir.path().join("b.ts"), "let b = 1;\n").unwrap();

    let raw = r#"<edits>
<edit file="a.ts" action="replace"><<<< SEARCH
let a = 1;
==== REPLACE
let a = 2;
>>>> END</edit>
<edit file="b.ts" action="replace" description="stale"><<<< SEARCH
let b = 7;
==== REPLACE
let b = 8;
>>>> END</edit>
<edit file="c.ts" action="create">export const c = 3;</edit>
</edits>"#;
    let AgentResponse::Edits { edits, .. } = classify(raw) else {
        panic!("expected edits");
    };

    let snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let store = LocalFileStore::new(Some(dir.path().to_path_buf()));
    let report = BatchApplier::new(&snapshot, &store).apply(&edits).await;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].description.as_deref(), Some("stale"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("a.ts")).unwrap(),
        "let a = 2;\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("b.ts")).unwrap(),
        "let b = 1;\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("c.ts")).unwrap(),
        "export const c = 3;"
    );
}

#[tokio::test]
async fn e2e_session_plan_then_approved_edits() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("src/lib.ts"), "function foo() {}\nfoo();\n").unwrap();

    let provider = Arc::new(ScriptedProvider::new(&[
        r#"```json
{"type":"plan","summary":"Rename foo to bar everywhere","files_to_touch":["src/lib.ts"]}
```"#,
        RENAME_EDITS,
    ]));
    let store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(Some(dir.path().to_path_buf())));
    let mut session = ChatSession::new(agent(provider, dir.path()), store.clone());
    let (tx, _rx) = mpsc::channel(256);

    let mut snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let handle = session.begin();
    let outcome = session
        .send("rename foo to bar", &snapshot, &handle, &tx)
        .await
        .unwrap();
    assert_eq!(outcome.response.kind(), "plan");
    let plan = std::fs::read_to_string(dir.path().join("implementation_plan.md")).unwrap();
    assert!(plan.contains("Rename foo to bar everywhere"));

    let handle = session.begin();
    let outcome = session.send("ok", &snapshot, &handle, &tx).await.unwrap();
    let AgentResponse::Edits { edits, .. } = outcome.response else {
        panic!("expected edits");
    };

    let mut review = EditReview::new("implementation_plan.md");
    review.receive(edits, &mut snapshot, store.as_ref()).await;
    let report = review.accept_all(&mut snapshot, store.as_ref()).await;

    assert!(report.is_clean());
    assert_eq!(review.accepted().len(), 2);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("src/lib.ts")).unwrap(),
        "function bar() {}\nbar();\n"
    );
    assert_eq!(session.conversation().len(), 4);
}

#[tokio::test]
async fn e2e_cancel_commits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(Some(dir.path().to_path_buf())));
    let mut session = ChatSession::new(agent(Arc::new(StallingProvider), dir.path()), store);
    let (tx, mut rx) = mpsc::channel(256);

    let snapshot = scan_project(dir.path(), &[], 6).unwrap();
    let handle = session.begin();
    let canceller = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let err = session
        .send("do something", &snapshot, &handle, &tx)
        .await
        .unwrap_err();
    drop(tx);

    assert!(matches!(err, AgentError::Cancelled));
    assert!(session.conversation().is_empty());
    while let Some(event) = rx.recv().await {
        assert!(!event.is_terminal(), "unexpected terminal event: {event:?}");
    }
}
