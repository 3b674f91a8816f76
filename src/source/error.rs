//! Error types for trend sources

use thiserror::Error;

/// Errors that can occur while fetching trend data
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Credentials missing or rejected (HTTP 401/403)
    #[error("Unauthorized: status {0}")]
    Unauthorized(u16),

    /// Request rejected by the provider (other 4xx)
    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Batch exceeds the provider's group limit
    #[error("Batch of {size} keyword groups exceeds limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Invalid date range
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded: {0}")]
    MaxRetriesExceeded(Box<SourceError>),
}

impl SourceError {
    /// Whether retrying the same request may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit | Self::ServerError(_) | Self::Timeout => true,
            Self::Unauthorized(_)
            | Self::Rejected { .. }
            | Self::Decode(_)
            | Self::BatchTooLarge { .. }
            | Self::InvalidRange(_)
            | Self::MaxRetriesExceeded(_) => false,
        }
    }
}

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;
