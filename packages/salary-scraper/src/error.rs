//! Typed errors for the scraping pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::types::Stage;

/// Errors raised by sources, the extractor, and output handling.
///
/// A page that loads but carries no post body is not an error; it surfaces
/// as [`DiscussionText::Missing`](crate::types::DiscussionText::Missing).
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Search failed or returned something unusable
    #[error("discovery failed on {source_name}: {message}")]
    Discovery { source_name: String, message: String },

    /// Every attempt to fetch a thread page failed
    #[error("retrieval of {url} failed after {attempts} attempts: {last_error}")]
    RetrievalExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// Every extraction attempt failed to produce parseable records
    #[error("extraction failed after {attempts} attempts: {last_error}")]
    Extraction { attempts: u32, last_error: String },

    /// A stage exceeded its deadline
    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: Stage, after: Duration },

    /// Language model call failed
    #[error("language model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
