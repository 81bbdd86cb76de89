//! View state shared by the workflows.
//!
//! [`SessionState`] is everything presentation needs to re-render. The
//! workflows in [`query`](crate::query), [`upload`](crate::upload) and
//! [`retrieve`](crate::retrieve) are its only writers.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{SearchResult, UploadFile};

/// Project used when none is configured.
pub const DEFAULT_PROJECT: &str = "backend";

/// A user-visible message tagged with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(m) | Notice::Error(m) => m,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success(_))
    }
}

/// Which query last went out; decides the busy label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Ask,
    Search,
}

/// How a workflow invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result was written into the state.
    Applied,
    /// The request failed; an error message was written into the state.
    Failed,
    /// Guard tripped (empty question, no file); nothing was sent.
    Skipped,
    /// A newer request of the same workflow was issued; the result was discarded.
    Stale,
}

/// Mutable session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub project: String,
    pub question: String,
    pub answer: String,
    /// Backend ranking order, most relevant first.
    pub sources: Vec<SearchResult>,
    pub loading: bool,
    pub query_kind: Option<QueryKind>,
    pub upload_file: Option<UploadFile>,
    pub upload_loading: bool,
    pub upload_message: Option<Notice>,
    pub download_loading: bool,
    pub download_message: Option<Notice>,
    api_base_url: String,
}

impl SessionState {
    pub fn new(api_base_url: String, project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            question: String::new(),
            answer: String::new(),
            sources: Vec::new(),
            loading: false,
            query_kind: None,
            upload_file: None,
            upload_loading: false,
            upload_message: None,
            download_loading: false,
            download_message: None,
            api_base_url,
        }
    }

    /// Base URL resolved when the session was created.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// Issues sequence numbers for one workflow's requests.
///
/// Only the holder of the most recently issued ticket may write results.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: AtomicU64,
}

/// Sequence number of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
