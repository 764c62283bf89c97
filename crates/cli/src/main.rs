//! Quill CLI: the main entry point.
//!
//! Commands:
//! - `init`: Write a default config file
//! - `chat`: Interactive or single-message agent chat
//! - `apply`: Apply the edits in a saved model response
//! - `parse`: Classify a saved model response
//! - `complete`: Inline fill-in-the-middle completion
//! - `models`: List models on the inference server
//! - `status`: Show configuration and server health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod dry_run;
mod render;

#[derive(Parser)]
#[command(
    name = "quill",
    about = "Quill — local-model coding agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init,

    /// Chat with the agent about a project
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Project folder (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// File focused in the editor, relative to the project
        #[arg(long)]
        active: Option<String>,

        /// Apply proposed edits without asking
        #[arg(long)]
        apply: bool,
    },

    /// Apply the edits in a saved model response
    Apply {
        /// File holding the raw model response
        file: PathBuf,

        /// Project folder (defaults to the current directory)
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the classified intent of a saved model response as JSON
    Parse {
        /// File holding the raw model response
        file: PathBuf,
    },

    /// Complete the code between a prefix and a suffix
    Complete {
        #[arg(long)]
        prefix: String,

        #[arg(long, default_value = "")]
        suffix: String,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },

    /// List models on the inference server
    Models,

    /// Show configuration and server health
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat {
            message,
            project,
            model,
            active,
            apply,
        } => {
            commands::chat::run(commands::chat::ChatArgs {
                message,
                project,
                model,
                active,
                apply,
            })
            .await?
        }
        Commands::Apply {
            file,
            project,
            dry_run,
        } => commands::apply::run(file, project, dry_run).await?,
        Commands::Parse { file } => commands::parse::run(file).await?,
        Commands::Complete {
            prefix,
            suffix,
            model,
        } => commands::complete::run(prefix, suffix, model).await?,
        Commands::Models => commands::models::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
