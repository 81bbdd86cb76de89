//! Wire and session data types.
//!
//! These types mirror the AIDE backend's JSON contract (camelCase on the
//! wire) plus the client-side file handle used by uploads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A ranked chunk match returned by `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub document_id: i64,
    pub document_name: String,
    pub document_path: String,
    pub chunk_id: i64,
    pub content: String,
    /// Relevance in `[0, 1]`.
    pub score: f64,
}

/// Body of `POST /api/ask` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AskRequest<'a> {
    pub question: &'a str,
    pub project: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub query: &'a str,
    pub project: &'a str,
}

/// Confirmation body of a `201 Created` upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub document_id: i64,
    pub chunk_count: i64,
}

/// A binary document fetched from `GET /api/documents/{id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    /// Filename suggested by the `content-disposition` header, if any.
    pub suggested_name: Option<String>,
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = guess_mime(&name).to_string();
        Self { name, mime, bytes }
    }

    /// Read a local file into an upload handle.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Ok(Self::new(name, bytes))
    }
}

fn guess_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
