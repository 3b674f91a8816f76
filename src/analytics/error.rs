//! Error types for the analytics pipeline

use thiserror::Error;

/// Errors that can occur while ingesting observations or computing metrics
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    /// An observation failed validation at ingestion time
    #[error("Malformed observation for '{entity}' at '{date}': {reason}")]
    MalformedObservation {
        entity: String,
        date: String,
        reason: String,
    },

    /// Moving average window must be at least 1
    #[error("Invalid window size: {0}")]
    InvalidWindowSize(usize),
}

impl AnalyticsError {
    pub(crate) fn malformed(
        entity: impl Into<String>,
        date: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedObservation {
            entity: entity.into(),
            date: date.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
