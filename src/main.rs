//! # AIDE CLI (`aide`)
//!
//! Talks to an AIDE backend: ask questions, search, upload documents and
//! download the originals behind search results.
//!
//! ## Usage
//!
//! ```bash
//! aide --config ./config/aide.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `aide ask "<question>"` | Ask a question and print the answer |
//! | `aide search "<query>"` | Print ranked sources |
//! | `aide upload <path>` | Upload a document |
//! | `aide get <id>` | Download a document |
//! | `aide endpoint` | Print the backend base URL in use |
//! | `aide shell` | Interactive session |
//!
//! The backend URL comes from `AIDE_API_URL`, then `[api].base_url`, then
//! `http://localhost:8080`.

use aide_client::config::{self, Config};
use aide_client::endpoint::HostContext;
use aide_client::models::UploadFile;
use aide_client::render::{render_notice, render_sources};
use aide_client::session::Session;
use aide_client::shell;
use aide_client::state::Outcome;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// AIDE CLI — ask, search and manage documentation in an AIDE backend.
#[derive(Parser)]
#[command(
    name = "aide",
    about = "AIDE — client for the AI-powered documentation search engine",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/aide.toml`. A missing file means defaults.
    #[arg(long, global = true, default_value = "./config/aide.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about the project's documentation.
    Ask {
        question: String,

        /// Project namespace (defaults to `[session].project`).
        #[arg(long)]
        project: Option<String>,
    },

    /// Search the project's documentation without generating an answer.
    Search {
        query: String,

        #[arg(long)]
        project: Option<String>,
    },

    /// Upload a document (pdf, txt, md, doc, docx) into a project.
    Upload {
        path: PathBuf,

        #[arg(long)]
        project: Option<String>,
    },

    /// Download the original document by id.
    Get {
        id: i64,

        /// File name to use when the backend does not suggest one.
        #[arg(long)]
        name: Option<String>,

        /// Directory to save into (defaults to `[downloads].dir`).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the backend base URL this client would use.
    Endpoint,

    /// Start an interactive session.
    Shell {
        #[arg(long)]
        project: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_on_failure(outcome: Outcome) {
    if outcome == Outcome::Failed {
        std::process::exit(1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg: Config = config::load_or_default(&cli.config)?;
    if let Commands::Get { out: Some(dir), .. } = &cli.command {
        cfg.downloads.dir = dir.clone();
    }

    let session = Session::connect(&cfg, HostContext::Client);

    match cli.command {
        Commands::Ask { question, project } => {
            if let Some(project) = project {
                session.set_project(project);
            }
            session.set_question(question);
            let outcome = session.submit_ask().await;
            if outcome == Outcome::Skipped {
                anyhow::bail!("question must not be empty");
            }
            let answer = session.snapshot().answer;
            if outcome == Outcome::Failed {
                eprintln!("{}", answer);
            } else {
                println!("{}", answer);
            }
            exit_on_failure(outcome);
        }
        Commands::Search { query, project } => {
            if let Some(project) = project {
                session.set_project(project);
            }
            session.set_question(query);
            let outcome = session.submit_search().await;
            if outcome == Outcome::Skipped {
                anyhow::bail!("query must not be empty");
            }
            let state = session.snapshot();
            if outcome == Outcome::Failed {
                eprintln!("{}", state.answer);
            } else if state.sources.is_empty() {
                println!("No results.");
            } else {
                print!("{}", render_sources(&state.sources));
            }
            exit_on_failure(outcome);
        }
        Commands::Upload { path, project } => {
            if let Some(project) = project {
                session.set_project(project);
            }
            session.select_file(UploadFile::from_path(&path).await?);
            let outcome = session.submit_upload().await;
            if let Some(notice) = session.snapshot().upload_message {
                println!("{}", render_notice(&notice));
            }
            exit_on_failure(outcome);
        }
        Commands::Get { id, name, .. } => {
            let fallback = name.unwrap_or_else(|| format!("document-{}", id));
            let outcome = session.retrieve_and_save(id, &fallback).await;
            if let Some(notice) = session.snapshot().download_message {
                println!("{}", render_notice(&notice));
            }
            exit_on_failure(outcome);
        }
        Commands::Endpoint => {
            println!("{}", session.api_base_url());
        }
        Commands::Shell { project } => {
            if let Some(project) = project {
                session.set_project(project);
            }
            shell::run_shell(Arc::new(session)).await?;
        }
    }

    Ok(())
}
