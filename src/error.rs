//! Normalized request failures.

use serde::Deserialize;
use thiserror::Error;

/// Longest backend message kept in [`ApiError::Status`].
const MAX_MESSAGE_LEN: usize = 512;

/// A failed call to the AIDE backend.
///
/// Every transport, status and payload problem collapses into one of these
/// three variants. Workflows log the error and show a fixed message; the
/// variants only matter for diagnostics.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    message: String,
}

impl ApiError {
    /// Build a [`ApiError::Status`] from a status code and raw response body.
    ///
    /// Uses the `message` field of a JSON error body when present, otherwise
    /// the body text itself.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<BackendErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) => String::from_utf8_lossy(body).trim().to_string(),
        };
        ApiError::Status {
            status,
            message: truncate(message),
        }
    }
}

fn truncate(mut message: String) -> String {
    if message.len() > MAX_MESSAGE_LEN {
        let mut cut = MAX_MESSAGE_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push_str("...");
    }
    message
}
