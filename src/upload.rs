//! Document upload workflow.

use crate::session::{Activity, Session};
use crate::state::{Notice, Outcome};

pub const UPLOAD_PROMPT: &str = "Please select a file";
pub const UPLOAD_SUCCESS: &str = "File uploaded successfully!";
pub const UPLOAD_ERROR: &str = "Error uploading file. Please try again.";

impl Session {
    /// Upload the selected file into the current project.
    ///
    /// On success the selection is cleared; on failure it is kept so the
    /// user can retry without picking the file again.
    pub async fn submit_upload(&self) -> Outcome {
        let (file, project) = self.update(|s| (s.upload_file.clone(), s.project.clone()));
        let Some(file) = file else {
            self.update(|s| s.upload_message = Some(Notice::Error(UPLOAD_PROMPT.to_string())));
            return Outcome::Skipped;
        };

        let ticket = self.upload_requests.issue();
        let _loading = self.begin(Activity::Upload);
        self.update(|s| s.upload_message = None);

        let result = self.backend().upload(&file, &project).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, file = %file.name, project = %project, "upload failed");
        }

        if !self.upload_requests.is_current(ticket) {
            tracing::debug!(?ticket, file = %file.name, "discarding superseded upload response");
            return Outcome::Stale;
        }

        match result {
            Ok(receipt) => {
                let message = match receipt {
                    Some(r) => format!(
                        "{} (document {}, {} chunks)",
                        UPLOAD_SUCCESS, r.document_id, r.chunk_count
                    ),
                    None => UPLOAD_SUCCESS.to_string(),
                };
                tracing::info!(file = %file.name, project = %project, "uploaded");
                self.update(|s| {
                    s.upload_message = Some(Notice::Success(message));
                    s.upload_file = None;
                });
                Outcome::Applied
            }
            Err(_) => {
                self.update(|s| s.upload_message = Some(Notice::Error(UPLOAD_ERROR.to_string())));
                Outcome::Failed
            }
        }
    }
}
