//! gemtrend - gemstone search-trend analytics
//!
//! Ranks tracked gemstones by current interest, momentum, stability and
//! market share from Naver DataLab daily search-interest series.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`analytics`] - Immutable time-series store and the ranking pipeline
//! - [`source`] - Trend data sources (Naver DataLab client)
//! - [`refresh`] - Refresh cycle and atomically published snapshot
//! - [`api`] - Read-only HTTP API over the snapshot
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and the entity registry
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```
//! use gemtrend::analytics::{TimeSeriesStore, TrendReport};
//! use gemtrend::config::AnalyticsConfig;
//! use gemtrend::models::RawObservation;
//!
//! let observations = vec![
//!     RawObservation::new("진주", "2024-01-01", 30.0),
//!     RawObservation::new("루비", "2024-01-01", 70.0),
//! ];
//! let (store, _duplicates) = TimeSeriesStore::ingest(observations)?;
//! let report = TrendReport::build(&store, &AnalyticsConfig::default())?;
//! assert_eq!(report.top_current[0].entity, "루비");
//! # Ok::<(), gemtrend::analytics::AnalyticsError>(())
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod refresh;
pub mod source;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{TimeSeriesStore, TrendReport};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, GemtrendErrorTrait, Result};
    pub use crate::models::{EntityRegistry, RawObservation, SeriesPoint};
    pub use crate::refresh::{Refresher, Snapshot, SnapshotHandle};
    pub use crate::source::{NaverDataLabClient, TrendSource};
}

// Direct re-exports for convenience
pub use models::{EntityRegistry, RawObservation, SeriesPoint};
