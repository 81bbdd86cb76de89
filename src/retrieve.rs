//! Document retrieval workflow.
//!
//! Fetches a document's original bytes and hands them to the session's
//! [`DownloadSink`](crate::traits::DownloadSink). The filename comes from
//! the response's `content-disposition` header when present, otherwise from
//! the display name the caller already knows (usually the search result's
//! `document_name`).

use crate::session::{Activity, Session};
use crate::state::{Notice, Outcome};

pub const DOWNLOAD_ERROR: &str = "Error downloading document. Please try again.";

/// Pick the filename for a download.
pub fn resolve_file_name(suggested: Option<&str>, fallback: &str) -> String {
    match suggested {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => fallback.to_string(),
    }
}

impl Session {
    /// Fetch document `document_id` and save it locally.
    pub async fn retrieve_and_save(&self, document_id: i64, fallback_name: &str) -> Outcome {
        let ticket = self.download_requests.issue();
        let _loading = self.begin(Activity::Download);
        self.update(|s| s.download_message = None);

        let result = match self.backend().fetch_document(document_id).await {
            Ok(doc) => {
                let name = resolve_file_name(doc.suggested_name.as_deref(), fallback_name);
                let saved = self.sink().save(&doc.bytes, &name).await;
                saved.map(|path| (name, path))
            }
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &result {
            tracing::error!(error = %e, document_id, "document download failed");
        }

        // Saving is a local side effect and has already happened; only the
        // notice is subject to fencing.
        if !self.download_requests.is_current(ticket) {
            tracing::debug!(?ticket, document_id, "discarding superseded download notice");
            return Outcome::Stale;
        }

        match result {
            Ok((name, path)) => {
                tracing::info!(document_id, path = %path.display(), "document saved");
                let message = format!("Saved {} to {}", name, path.display());
                self.update(|s| s.download_message = Some(Notice::Success(message)));
                Outcome::Applied
            }
            Err(_) => {
                self.update(|s| {
                    s.download_message = Some(Notice::Error(DOWNLOAD_ERROR.to_string()))
                });
                Outcome::Failed
            }
        }
    }
}
