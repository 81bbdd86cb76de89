//! Plain-text presentation of the view state.
//!
//! Used by the `aide` binary for one-shot output and by the interactive
//! shell after each workflow lands.

use std::fmt::Write;

use crate::models::SearchResult;
use crate::state::{Notice, QueryKind, SessionState};

/// Format a `[0, 1]` relevance score as a percentage with one decimal, e.g. `87.3%`.
pub fn format_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// One line per source header plus its indented content.
pub fn render_sources(sources: &[SearchResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sources ({})", sources.len());
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(
            out,
            "[{}] {}, Chunk {}  Score: {}",
            i + 1,
            source.document_name,
            source.chunk_id,
            format_score(source.score)
        );
        for line in source.content.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(m) => format!("ok: {}", m),
        Notice::Error(m) => format!("error: {}", m),
    }
}

/// Button-style label for the query area.
pub fn query_status(state: &SessionState) -> &'static str {
    match (state.loading, state.query_kind) {
        (false, _) => "Ready",
        (true, Some(QueryKind::Search)) => "Searching...",
        (true, _) => "Asking...",
    }
}

/// Everything a user would see on the page.
pub fn render_state(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Backend:  {}", state.api_base_url());
    let _ = writeln!(out, "Project:  {}", state.project);
    if !state.question.is_empty() {
        let _ = writeln!(out, "Question: {}", state.question);
    }
    let _ = writeln!(out, "Status:   {}", query_status(state));

    match &state.upload_file {
        Some(file) => {
            let _ = writeln!(out, "File:     {} ({} bytes)", file.name, file.bytes.len());
        }
        None => {
            let _ = writeln!(out, "File:     (none selected)");
        }
    }
    if state.upload_loading {
        let _ = writeln!(out, "Uploading...");
    }
    if let Some(notice) = &state.upload_message {
        let _ = writeln!(out, "{}", render_notice(notice));
    }
    if state.download_loading {
        let _ = writeln!(out, "Downloading...");
    }
    if let Some(notice) = &state.download_message {
        let _ = writeln!(out, "{}", render_notice(notice));
    }

    if !state.answer.is_empty() {
        let _ = writeln!(out, "\nAnswer\n{}", state.answer);
    }
    if !state.sources.is_empty() {
        let _ = write!(out, "\n{}", render_sources(&state.sources));
    }
    out
}
