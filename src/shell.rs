//! Interactive shell (`aide shell`).
//!
//! Reads commands from stdin and runs each workflow as its own task, so a
//! slow upload does not block asking questions. Results are printed as they
//! land.
//!
//! | Input | Action |
//! |-------|--------|
//! | `<text>` | Set the question and ask |
//! | `/ask [text]` | Ask (optionally replacing the question) |
//! | `/search [text]` | Search only |
//! | `/project <name>` | Switch project |
//! | `/file <path>` | Select a file for upload |
//! | `/upload` | Upload the selected file |
//! | `/open <n>` | Download the n-th listed source |
//! | `/state` | Print the full view |
//! | `/help` | Show commands |
//! | `/quit` | Leave (waits for outstanding requests) |

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

use crate::models::UploadFile;
use crate::render::{render_notice, render_sources, render_state};
use crate::session::Session;
use crate::state::Outcome;

const HELP: &str = "\
  <text>           ask a question
  /ask [text]      ask (current question if no text)
  /search [text]   search only
  /project <name>  switch project
  /file <path>     select a file for upload
  /upload          upload the selected file
  /open <n>        download source n
  /state           show everything
  /quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Ask(Option<String>),
    Search(Option<String>),
    Project(String),
    File(PathBuf),
    Upload,
    Open(usize),
    State,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ShellCommand::Ask(Some(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    let text = (!arg.is_empty()).then(|| arg.to_string());

    match name {
        "ask" => ShellCommand::Ask(text),
        "search" => ShellCommand::Search(text),
        "project" => match text {
            Some(project) => ShellCommand::Project(project),
            None => ShellCommand::Invalid("usage: /project <name>".into()),
        },
        "file" => match text {
            Some(path) => ShellCommand::File(PathBuf::from(path)),
            None => ShellCommand::Invalid("usage: /file <path>".into()),
        },
        "upload" => ShellCommand::Upload,
        "open" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => ShellCommand::Open(n),
            _ => ShellCommand::Invalid("usage: /open <n> (n starts at 1)".into()),
        },
        "state" => ShellCommand::State,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => ShellCommand::Invalid(format!("unknown command: /{}", other)),
    }
}

/// Run the shell until `/quit` or end of input.
pub async fn run_shell(session: Arc<Session>) -> Result<()> {
    println!(
        "aide shell: project '{}' at {}. /help for commands.",
        session.snapshot().project,
        session.api_base_url()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    while let Some(line) = lines.next_line().await? {
        // Reap finished tasks so the set does not grow without bound.
        while tasks.try_join_next().is_some() {}

        match parse_line(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Invalid(msg) => println!("{}", msg),
            ShellCommand::State => print!("{}", render_state(&session.snapshot())),
            ShellCommand::Project(project) => {
                session.set_project(project);
                println!("project: {}", session.snapshot().project);
            }
            ShellCommand::File(path) => match UploadFile::from_path(&path).await {
                Ok(file) => {
                    println!("selected {} ({} bytes)", file.name, file.bytes.len());
                    session.select_file(file);
                }
                Err(e) => println!("error: {:#}", e),
            },
            ShellCommand::Ask(text) => {
                if let Some(text) = text {
                    session.set_question(text);
                }
                let s = session.clone();
                tasks.spawn(async move {
                    if s.submit_ask().await == Outcome::Skipped {
                        println!("enter a question first");
                        return;
                    }
                    let state = s.snapshot();
                    if !state.answer.is_empty() {
                        println!("\n{}\n", state.answer);
                    }
                });
            }
            ShellCommand::Search(text) => {
                if let Some(text) = text {
                    session.set_question(text);
                }
                let s = session.clone();
                tasks.spawn(async move {
                    match s.submit_search().await {
                        Outcome::Skipped => println!("enter a question first"),
                        Outcome::Failed => println!("{}", s.snapshot().answer),
                        Outcome::Applied => {
                            let state = s.snapshot();
                            if state.sources.is_empty() {
                                println!("No results.");
                            } else {
                                print!("{}", render_sources(&state.sources));
                            }
                        }
                        Outcome::Stale => {}
                    }
                });
            }
            ShellCommand::Upload => {
                let s = session.clone();
                tasks.spawn(async move {
                    s.submit_upload().await;
                    if let Some(notice) = s.snapshot().upload_message {
                        println!("{}", render_notice(&notice));
                    }
                });
            }
            ShellCommand::Open(n) => {
                let Some(source) = session.snapshot().sources.get(n - 1).cloned() else {
                    println!("no source #{}", n);
                    continue;
                };
                let s = session.clone();
                tasks.spawn(async move {
                    s.retrieve_and_save(source.document_id, &source.document_name)
                        .await;
                    if let Some(notice) = s.snapshot().download_message {
                        println!("{}", render_notice(&notice));
                    }
                });
            }
        }
    }

    while tasks.join_next().await.is_some() {}
    Ok(())
}
