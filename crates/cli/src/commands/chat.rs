//! `quill chat`: Interactive or single-message agent chat.

use crate::render::{print_report, print_response};
use quill_agent::{AgentError, AgentLoop, AgentStreamEvent, ChatSession, RequestHandle};
use quill_config::AppConfig;
use quill_core::{AgentResponse, FileStore, ProjectSnapshot, Provider};
use quill_patch::EditReview;
use quill_providers::OllamaProvider;
use quill_tools::{LocalFileStore, ToolExecutor, ToolScope, load_project};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

pub struct ChatArgs {
    pub message: Option<String>,
    pub project: Option<PathBuf>,
    pub model: Option<String>,
    pub active: Option<String>,
    pub apply: bool,
}

struct Host {
    config: AppConfig,
    root: PathBuf,
    active: Option<String>,
    store: Arc<dyn FileStore>,
    review: EditReview,
    auto_apply: bool,
}

impl Host {
    /// Rescan the project so each request sees the current tree.
    async fn snapshot(&self) -> Result<ProjectSnapshot, Box<dyn std::error::Error>> {
        let mut snapshot = load_project(
            self.root.clone(),
            self.config.workspace.ai_ignored.clone(),
            self.config.workspace.max_tree_depth,
        )
        .await?;
        if let Some(active) = &self.active {
            let path = self.root.join(active).to_string_lossy().into_owned();
            match self.store.read(&path).await {
                Ok(content) => {
                    snapshot = snapshot.with_file(path.clone(), content).with_active_file(path);
                }
                Err(e) => warn!(path = %path, error = %e, "Active file not readable"),
            }
        }
        Ok(snapshot)
    }

    async fn review_edits(
        &mut self,
        edits: Vec<quill_core::Edit>,
        snapshot: &mut ProjectSnapshot,
        stdin: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let store = self.store.clone();
        let report = self.review.receive(edits, snapshot, store.as_ref()).await;
        print_report(&report);

        if self.review.is_settled() {
            return Ok(());
        }

        let accept = if self.auto_apply {
            true
        } else {
            print!("  Apply {} edit(s)? [y/N] ", self.review.pending().len());
            std::io::stdout().flush()?;
            let answer = stdin.next_line().await?.unwrap_or_default();
            matches!(answer.trim(), "y" | "Y" | "yes")
        };

        if accept {
            let report = self.review.accept_all(snapshot, store.as_ref()).await;
            print_report(&report);
        } else {
            let dropped = self.review.reject_all();
            println!("  Discarded {} edit(s)", dropped.len());
        }
        Ok(())
    }
}

/// Print streamed events until the channel closes.
fn spawn_printer(mut rx: mpsc::Receiver<AgentStreamEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AgentStreamEvent::Token { content } => {
                    print!("{content}");
                    let _ = std::io::stdout().flush();
                }
                AgentStreamEvent::Error { message } => eprintln!("\n  [Error] {message}"),
                AgentStreamEvent::ToolCall { .. }
                | AgentStreamEvent::ToolResult { .. }
                | AgentStreamEvent::Done { .. } => {}
            }
        }
    })
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let root = super::project_root(args.project)?;

    let provider: Arc<dyn Provider> = Arc::new(OllamaProvider::from_config(&config.ollama));
    let scope = ToolScope::new(Some(root.clone()))
        .restricted(config.agent.restrict_tools_to_project);
    let tools = Arc::new(ToolExecutor::new(scope));

    let mut agent = AgentLoop::from_config(provider, tools, &config);
    if let Some(model) = args.model {
        agent = agent.with_model(model);
    }
    let model = agent.model().to_string();

    let store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(Some(root.clone())));
    let mut session = ChatSession::from_config(agent, store.clone(), &config);
    let mut host = Host {
        review: EditReview::new(config.workspace.plan_file.clone()),
        config,
        root,
        active: args.active,
        store,
        auto_apply: args.apply,
    };

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    if let Some(message) = args.message {
        return send(&mut session, &mut host, message, &mut stdin).await;
    }

    println!();
    println!("  Quill — Interactive Mode");
    println!("  Project:  {}", host.root.display());
    println!("  Model:    {model}");
    println!("  Ctrl+C stops a running request; type 'exit' to quit.");
    println!();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;
        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "/clear" => {
                session.clear();
                println!("  History cleared.");
                continue;
            }
            _ => {}
        }

        if let Err(e) = send(&mut session, &mut host, line.to_string(), &mut stdin).await {
            eprintln!("  [Error] {e}");
        }
        println!();
    }

    println!("\n  Goodbye!\n");
    Ok(())
}

async fn send(
    session: &mut ChatSession,
    host: &mut Host,
    message: String,
    stdin: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut snapshot = host.snapshot().await?;
    let handle = session.begin();
    let watcher = watch_ctrl_c(handle.clone());

    let (tx, rx) = mpsc::channel(256);
    let printer = spawn_printer(rx);
    let result = session.send(message, &snapshot, &handle, &tx).await;
    drop(tx);
    watcher.abort();
    let _ = printer.await;

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(AgentError::Cancelled) => {
            println!("\n  ⏹  Stopped.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_response(&outcome.response);
    if let AgentResponse::Edits { edits, .. } = outcome.response {
        host.review_edits(edits, &mut snapshot, stdin).await?;
    }
    Ok(())
}

fn watch_ctrl_c(handle: RequestHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    })
}
