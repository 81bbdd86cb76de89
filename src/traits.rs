//! Seams between the workflows and the outside world.
//!
//! Workflows never talk to HTTP or the filesystem directly. They go through
//! two traits so that a session can run against the real backend, an
//! in-memory double, or a custom transport:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                 Session                  │
//! │   query      upload      retrieve        │
//! └──────┬──────────┬───────────┬────────────┘
//!        ▼          ▼           ▼
//!   ┌──────────────────────┐  ┌─────────────┐
//!   │  Backend (ApiClient) │  │DownloadSink │
//!   └──────────────────────┘  └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use aide_client::client::ApiClient;
//! use aide_client::download::DirectorySink;
//! use aide_client::session::Session;
//! use std::sync::Arc;
//!
//! let base_url = "http://localhost:8080".to_string();
//! let backend = Arc::new(ApiClient::new(base_url.clone()));
//! let sink = Arc::new(DirectorySink::new("./downloads"));
//! let session = Session::new(base_url, "backend", backend, sink);
//! ```

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ApiError;
use crate::models::{AskResponse, FetchedDocument, SearchResult, UploadFile, UploadReceipt};

// ═══════════════════════════════════════════════════════════════════════
// Backend Trait
// ═══════════════════════════════════════════════════════════════════════

/// The AIDE backend HTTP contract.
///
/// Each method is attempted exactly once. Implementations report every
/// failure as an [`ApiError`] and never retry.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/ask` with `{question, project}`.
    async fn ask(&self, question: &str, project: &str) -> Result<AskResponse, ApiError>;

    /// `POST /api/search` with `{query, project}`.
    ///
    /// An empty response body yields an empty vector. Order is the backend's
    /// ranking and must be preserved.
    async fn search(&self, query: &str, project: &str) -> Result<Vec<SearchResult>, ApiError>;

    /// `POST /api/documents` as multipart (`file`, `project`).
    ///
    /// Returns the backend's receipt when the response body carries one.
    async fn upload(
        &self,
        file: &UploadFile,
        project: &str,
    ) -> Result<Option<UploadReceipt>, ApiError>;

    /// `GET /api/documents/{id}` as a binary payload.
    async fn fetch_document(&self, document_id: i64) -> Result<FetchedDocument, ApiError>;
}

// ═══════════════════════════════════════════════════════════════════════
// DownloadSink Trait
// ═══════════════════════════════════════════════════════════════════════

/// Destination for retrieved documents.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save `bytes` under `file_name` and return where they ended up.
    async fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf>;
}
