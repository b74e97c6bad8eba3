//! Rate feed error types.

use thiserror::Error;

/// Errors raised while fetching or decoding an upstream rate feed.
///
/// These never reach the rate table: a feed that fails is logged and retried
/// on the next tick.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure or non-success HTTP status.
    #[error("Rate feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload is not a valid feed document.
    #[error("Rate feed payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// A quote in an otherwise valid document is unusable.
    #[error("Invalid quote for '{currency}': {reason}")]
    InvalidQuote { currency: String, reason: String },
}

/// Result type for rate feed operations.
pub type FeedResult<T> = Result<T, FeedError>;
