//! Unified error handling for the gemtrend crate
//!
//! This module provides a unified error type that consolidates the refresh
//! path's domain-specific errors into a single `Error` enum, while
//! maintaining the ability to use domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`GemtrendErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

pub use crate::analytics::error::AnalyticsError;
pub use crate::source::error::SourceError;

/// Common trait for all gemtrend error types
pub trait GemtrendErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Upstream trend source errors (HTTP, timeout, rate limit)
    Network,
    /// Upstream responses that could not be decoded
    Parsing,
    /// Observation validation errors
    Ingestion,
    /// Analytics parameter errors
    Analytics,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Ingestion => "ingestion",
            Self::Analytics => "analytics",
        }
    }
}

/// Unified error type for the gemtrend crate
#[derive(Error, Debug)]
pub enum Error {
    /// Ingestion and analytics errors
    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    /// Trend source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl GemtrendErrorTrait for SourceError {
    fn is_recoverable(&self) -> bool {
        SourceError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::MaxRetriesExceeded(last) => last.category(),
            _ => ErrorCategory::Network,
        }
    }
}

impl GemtrendErrorTrait for AnalyticsError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedObservation { .. } => ErrorCategory::Ingestion,
            Self::InvalidWindowSize(_) => ErrorCategory::Analytics,
        }
    }
}

impl GemtrendErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Source(e) => GemtrendErrorTrait::is_recoverable(e),
            Self::Analytics(e) => GemtrendErrorTrait::is_recoverable(e),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Source(e) => e.category(),
            Self::Analytics(e) => e.category(),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
