//! Analytics pipeline over daily search-interest series
//!
//! Everything here is a pure function of an immutable [`TimeSeriesStore`]:
//! - Moving averages by position
//! - Momentum (rise score) ranking
//! - Stability (coefficient of variation) ranking
//! - Monthly seasonality
//! - Market share of the latest snapshot
//!
//! Ratio-based metrics are `Option<f64>`; `None` means undefined and the
//! entity is left out of that ranking.

pub mod error;
pub mod momentum;
pub mod moving_average;
pub mod report;
pub mod seasonal;
pub mod share;
pub mod stability;
pub mod store;
pub mod top_k;

pub use error::{AnalyticsError, AnalyticsResult};
pub use momentum::{rise_score, MomentumRanker, RiseScore, RisingEntity};
pub use moving_average::{latest_moving_average, moving_average, MovingAveragePoint};
pub use report::{top_current, CurrentValue, TrendReport};
pub use seasonal::{MonthlyMean, SeasonalAggregator, YearMonth};
pub use share::{market_share, MarketShare};
pub use stability::{StabilityRanker, StabilityRanking, StabilityRow, StabilityStats};
pub use store::{DuplicateObservation, TimeSeriesStore};
pub use top_k::{top_k, Ranked, SortOrder};

/// Default ranking size
pub const DEFAULT_TOP_K: usize = 5;

/// Round half away from zero to 2 decimals
///
/// Values that round to zero come back as `0.0`, never `-0.0`.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}
