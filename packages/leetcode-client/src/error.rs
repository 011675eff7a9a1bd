//! Error types for the LeetCode client.

use thiserror::Error;

/// Result type for LeetCode client operations.
pub type Result<T> = std::result::Result<T, LeetCodeError>;

/// LeetCode client errors.
#[derive(Debug, Error)]
pub enum LeetCodeError {
    /// Transport failure (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL endpoint returned an `errors` payload
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// Body was not the expected shape
    #[error("parse error: {0}")]
    Parse(String),
}

impl LeetCodeError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport errors and non-success statuses are transient; malformed
    /// payloads and GraphQL errors will not change on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}
