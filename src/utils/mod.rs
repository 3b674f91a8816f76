//! Common utilities and helper functions

pub mod retry;

pub use retry::{with_retry_if, RetryConfig, RetryError};
