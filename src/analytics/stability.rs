//! Stability ranking by coefficient of variation

use super::round2;
use super::store::TimeSeriesStore;
use super::top_k::{top_k, Ranked, SortOrder};
use crate::models::SeriesPoint;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean, sample standard deviation and CV over an entity's full span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityStats {
    pub entity: String,
    pub observations: usize,
    pub mean: f64,

    /// Sample standard deviation; `None` below two observations
    pub stdev: Option<f64>,

    /// `stdev / mean` rounded to 2 decimals; `None` if the mean is zero or
    /// fewer than two observations exist
    pub cv: Option<f64>,
}

impl StabilityStats {
    /// Compute stats for one series. Returns `None` for an empty series.
    #[must_use]
    pub fn compute(entity: &str, series: &[SeriesPoint]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }

        let ratios: Vec<f64> = series.iter().map(|p| p.ratio).collect();
        let mean = ratios.iter().mean();
        let stdev = (ratios.len() >= 2).then(|| ratios.iter().std_dev());
        let cv = match stdev {
            Some(sd) if mean != 0.0 => Some(round2(sd / mean)),
            _ => None,
        };

        Some(Self {
            entity: entity.to_string(),
            observations: ratios.len(),
            mean,
            stdev,
            cv,
        })
    }
}

/// Row of a stability ranking; only built for defined CV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityRow {
    pub entity: String,
    pub mean: f64,
    pub stdev: f64,
    pub cv: f64,
}

impl Ranked for StabilityRow {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn score(&self) -> f64 {
        self.cv
    }
}

/// Most stable and most volatile entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityRanking {
    pub most_stable: Vec<StabilityRow>,
    pub most_volatile: Vec<StabilityRow>,
}

/// Ranks entities by coefficient of variation
#[derive(Debug, Clone)]
pub struct StabilityRanker {
    top_k: usize,
}

impl StabilityRanker {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Stats for every entity, in entity order
    pub fn stats(&self, store: &TimeSeriesStore) -> Vec<StabilityStats> {
        store
            .iter()
            .filter_map(|(entity, series)| StabilityStats::compute(entity, series))
            .collect()
    }

    /// Ascending-CV and descending-CV rankings over entities with defined CV
    pub fn rank(&self, store: &TimeSeriesStore) -> StabilityRanking {
        let rows: Vec<StabilityRow> = self
            .stats(store)
            .into_iter()
            .filter_map(|s| match (s.stdev, s.cv) {
                (Some(stdev), Some(cv)) => Some(StabilityRow {
                    entity: s.entity,
                    mean: s.mean,
                    stdev,
                    cv,
                }),
                _ => None,
            })
            .collect();

        StabilityRanking {
            most_stable: top_k(rows.clone(), SortOrder::Ascending, self.top_k),
            most_volatile: top_k(rows, SortOrder::Descending, self.top_k),
        }
    }
}

impl Default for StabilityRanker {
    fn default() -> Self {
        Self::new(super::DEFAULT_TOP_K)
    }
}
