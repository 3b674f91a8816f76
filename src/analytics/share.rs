//! Market share of the latest snapshot

use super::round2;
use super::store::TimeSeriesStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Share of total latest interest held by one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketShare {
    pub entity: String,

    /// Date of the entity's latest observation
    pub date: NaiveDate,
    pub ratio: f64,

    /// Percentage of the total, rounded to 2 decimals
    pub share_pct: f64,
}

/// Convert each entity's latest ratio into a percentage of the sum
///
/// Latest dates need not coincide across entities. When every latest
/// ratio is zero, every share is 0.
#[must_use]
pub fn market_share(store: &TimeSeriesStore) -> Vec<MarketShare> {
    let latest: Vec<(&str, NaiveDate, f64)> = store
        .entities()
        .filter_map(|entity| store.latest(entity).map(|p| (entity, p.date, p.ratio)))
        .collect();

    let total: f64 = latest.iter().map(|(_, _, ratio)| ratio).sum();

    latest
        .into_iter()
        .map(|(entity, date, ratio)| MarketShare {
            entity: entity.to_string(),
            date,
            ratio,
            share_pct: if total > 0.0 {
                round2(ratio / total * 100.0)
            } else {
                0.0
            },
        })
        .collect()
}
