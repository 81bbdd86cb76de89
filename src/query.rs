//! Ask and search-only workflows.
//!
//! Both read the shared `question` and `project` fields, drive the query
//! loading flag and write either `answer` or `sources`, never both. The
//! question is left in place so the user can re-run it.

use crate::session::{Activity, Session};
use crate::state::{Outcome, QueryKind};

pub const ASK_ERROR: &str = "Error asking question. Please try again.";
pub const SEARCH_ERROR: &str = "Error searching. Please try again.";

impl Session {
    /// Ask the backend to answer the current question.
    pub async fn submit_ask(&self) -> Outcome {
        let (question, project) = self.update(|s| (s.question.clone(), s.project.clone()));
        if question.trim().is_empty() {
            return Outcome::Skipped;
        }

        let ticket = self.query_requests.issue();
        let _loading = self.begin(Activity::Query);
        self.update(|s| s.query_kind = Some(QueryKind::Ask));
        let result = self.backend().ask(&question, &project).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, project = %project, "ask failed");
        }

        if !self.query_requests.is_current(ticket) {
            tracing::debug!(?ticket, "discarding superseded ask response");
            return Outcome::Stale;
        }

        match result {
            Ok(response) => {
                self.update(|s| {
                    s.answer = response.answer;
                    s.sources.clear();
                });
                Outcome::Applied
            }
            Err(_) => {
                self.update(|s| s.answer = ASK_ERROR.to_string());
                Outcome::Failed
            }
        }
    }

    /// Fetch ranked sources for the current question without generating an answer.
    pub async fn submit_search(&self) -> Outcome {
        let (query, project) = self.update(|s| (s.question.clone(), s.project.clone()));
        if query.trim().is_empty() {
            return Outcome::Skipped;
        }

        let ticket = self.query_requests.issue();
        let _loading = self.begin(Activity::Query);
        self.update(|s| s.query_kind = Some(QueryKind::Search));
        let result = self.backend().search(&query, &project).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, project = %project, "search failed");
        }

        if !self.query_requests.is_current(ticket) {
            tracing::debug!(?ticket, "discarding superseded search response");
            return Outcome::Stale;
        }

        match result {
            Ok(sources) => {
                tracing::debug!(count = sources.len(), "search returned");
                self.update(|s| {
                    s.sources = sources;
                    s.answer.clear();
                });
                Outcome::Applied
            }
            Err(_) => {
                self.update(|s| s.answer = SEARCH_ERROR.to_string());
                Outcome::Failed
            }
        }
    }
}
