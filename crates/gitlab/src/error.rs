//! Error types for the GitLab client.

use thiserror::Error;

/// Result type alias using the GitLab error type.
pub type Result<T> = std::result::Result<T, GitLabError>;

/// Errors returned by GitLab API calls.
#[derive(Debug, Error)]
pub enum GitLabError {
    /// The server URL cannot be used as an API base.
    #[error("Invalid GitLab server URL '{url}': {message}")]
    InvalidServerUrl {
        /// URL as configured
        url: String,
        /// Why it was rejected
        message: String,
    },

    /// The API answered with a non-success status.
    #[error("GitLab API returned {status} for {operation}: {message}")]
    Api {
        /// Operation that failed (e.g. `create variable`)
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body as returned by GitLab
        message: String,
    },

    /// Transport or decoding failure.
    #[error("GitLab request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl GitLabError {
    /// HTTP status of an API error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
