//! Named result sets assembled from one store

use super::error::AnalyticsResult;
use super::momentum::{MomentumRanker, RisingEntity};
use super::seasonal::{MonthlyMean, SeasonalAggregator};
use super::share::{market_share, MarketShare};
use super::stability::{StabilityRanker, StabilityRow};
use super::store::TimeSeriesStore;
use super::top_k::{top_k, Ranked, SortOrder};
use crate::config::AnalyticsConfig;
use crate::models::SeriesPoint;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Latest observed value of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentValue {
    pub entity: String,
    pub date: NaiveDate,
    pub ratio: f64,
}

impl Ranked for CurrentValue {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn score(&self) -> f64 {
        self.ratio
    }
}

/// Highest latest ratios, descending
#[must_use]
pub fn top_current(store: &TimeSeriesStore, k: usize) -> Vec<CurrentValue> {
    let current = store
        .entities()
        .filter_map(|entity| {
            store.latest(entity).map(|p| CurrentValue {
                entity: entity.to_string(),
                date: p.date,
                ratio: p.ratio,
            })
        })
        .collect();

    top_k(current, SortOrder::Descending, k)
}

/// Every result set handed to presentation for one refresh
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub generated_at: DateTime<Utc>,

    /// Latest observation date across the store
    pub as_of: Option<NaiveDate>,

    pub top_current: Vec<CurrentValue>,
    pub rising: Vec<RisingEntity>,
    pub most_stable: Vec<StabilityRow>,
    pub most_volatile: Vec<StabilityRow>,
    pub market_share: Vec<MarketShare>,
    pub seasonal: SeasonalAggregator,

    /// Entity whose raw series is reported as `brand_series`
    pub watched_entity: String,
    pub brand_series: Vec<SeriesPoint>,
}

impl TrendReport {
    /// Run every analytic over the store
    ///
    /// # Errors
    ///
    /// Returns an error only if the configured windows are invalid.
    pub fn build(store: &TimeSeriesStore, config: &AnalyticsConfig) -> AnalyticsResult<Self> {
        let momentum = MomentumRanker::new(config.short_window, config.long_window, config.top_k)?;
        let stability = StabilityRanker::new(config.top_k).rank(store);

        Ok(Self {
            generated_at: Utc::now(),
            as_of: store.date_range().map(|(_, last)| last),
            top_current: top_current(store, config.top_k),
            rising: momentum.rank(store)?,
            most_stable: stability.most_stable,
            most_volatile: stability.most_volatile,
            market_share: market_share(store),
            seasonal: SeasonalAggregator::from_store(store),
            watched_entity: config.watched_entity.clone(),
            brand_series: store.series_for(&config.watched_entity).to_vec(),
        })
    }

    /// Monthly means for one entity
    #[must_use]
    pub fn seasonal_for(&self, entity: &str) -> &[MonthlyMean] {
        self.seasonal.series_for(entity)
    }
}
