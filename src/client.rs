//! HTTP client for the AIDE backend.
//!
//! [`ApiClient`] implements [`Backend`] over `reqwest`. It builds absolute
//! URLs from the session's base URL and turns every failure into an
//! [`ApiError`]. User-facing messages are the workflows' job, not this one's.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ask` | Generate an answer from the project's documents |
//! | `POST` | `/api/search` | Ranked chunk matches |
//! | `POST` | `/api/documents` | Multipart upload (`file`, `project`) |
//! | `GET`  | `/api/documents/{id}` | Original document bytes |

use async_trait::async_trait;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Response;

use crate::download::filename_from_content_disposition;
use crate::endpoint::build_url;
use crate::error::ApiError;
use crate::models::{
    AskRequest, AskResponse, FetchedDocument, SearchRequest, SearchResult, UploadFile,
    UploadReceipt,
};
use crate::traits::Backend;

/// Async client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (proxies, custom TLS, ...).
    pub fn with_http_client(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        build_url(&self.base_url, path)
    }
}

/// Return the response if it has a 2xx status, otherwise an [`ApiError::Status`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    Err(ApiError::from_status(status.as_u16(), &body))
}

#[async_trait]
impl Backend for ApiClient {
    async fn ask(&self, question: &str, project: &str) -> Result<AskResponse, ApiError> {
        let url = self.url("/api/ask");
        tracing::debug!(%url, project, "ask");

        let response = self
            .http
            .post(&url)
            .json(&AskRequest { question, project })
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn search(&self, query: &str, project: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = self.url("/api/search");
        tracing::debug!(%url, project, "search");

        let response = self
            .http
            .post(&url)
            .json(&SearchRequest { query, project })
            .send()
            .await?;
        let body = check_status(response).await?.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let results: Option<Vec<SearchResult>> = serde_json::from_slice(&body)?;
        Ok(results.unwrap_or_default())
    }

    async fn upload(
        &self,
        file: &UploadFile,
        project: &str,
    ) -> Result<Option<UploadReceipt>, ApiError> {
        let url = self.url("/api/documents");
        tracing::debug!(%url, project, file = %file.name, size = file.bytes.len(), "upload");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new()
            .part("file", part)
            .text("project", project.to_string());

        let response = self.http.post(&url).multipart(form).send().await?;
        let body = check_status(response).await?.bytes().await?;

        // Status alone decides success; the receipt is informational.
        let receipt = serde_json::from_slice::<UploadReceipt>(&body).ok();
        if receipt.is_none() && !body.is_empty() {
            tracing::debug!("upload response carried no receipt");
        }
        Ok(receipt)
    }

    async fn fetch_document(&self, document_id: i64) -> Result<FetchedDocument, ApiError> {
        let url = self.url(&format!("/api/documents/{}", document_id));
        tracing::debug!(%url, "fetch document");

        let response = check_status(self.http.get(&url).send().await?).await?;
        let suggested_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            // The backend writes raw UTF-8 names, which `to_str` rejects.
            .and_then(|v| {
                filename_from_content_disposition(&String::from_utf8_lossy(v.as_bytes()))
            });
        let bytes = response.bytes().await?.to_vec();

        Ok(FetchedDocument {
            bytes,
            suggested_name,
        })
    }
}
