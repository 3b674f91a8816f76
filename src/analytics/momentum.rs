//! Rise score: short-window vs long-window momentum

use super::error::{AnalyticsError, AnalyticsResult};
use super::moving_average::latest_moving_average;
use super::round2;
use super::store::TimeSeriesStore;
use super::top_k::{top_k, Ranked, SortOrder};
use serde::{Deserialize, Serialize};

/// Default short moving-average window (days)
pub const DEFAULT_SHORT_WINDOW: usize = 7;

/// Default long moving-average window (days)
pub const DEFAULT_LONG_WINDOW: usize = 28;

/// Rise score of one entity at its latest date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiseScore {
    pub entity: String,

    /// Short-window moving average at the latest date
    pub short_ma: Option<f64>,

    /// Long-window moving average at the latest date
    pub long_ma: Option<f64>,

    /// `(short − long) / long × 100`, rounded to 2 decimals
    pub score: Option<f64>,
}

/// Row of the rising ranking; only built for defined scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RisingEntity {
    pub entity: String,
    pub rise_score: f64,
}

impl Ranked for RisingEntity {
    fn entity(&self) -> &str {
        &self.entity
    }

    fn score(&self) -> f64 {
        self.rise_score
    }
}

/// Rise score from two moving averages
///
/// `None` if either average is undefined or the long average is zero.
#[must_use]
pub fn rise_score(short_ma: Option<f64>, long_ma: Option<f64>) -> Option<f64> {
    match (short_ma, long_ma) {
        (Some(short), Some(long)) if long != 0.0 => Some(round2((short - long) / long * 100.0)),
        _ => None,
    }
}

/// Ranks entities by momentum
#[derive(Debug, Clone)]
pub struct MomentumRanker {
    short_window: usize,
    long_window: usize,
    top_k: usize,
}

impl MomentumRanker {
    /// Create a ranker
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidWindowSize`] if either window is 0.
    pub fn new(short_window: usize, long_window: usize, top_k: usize) -> AnalyticsResult<Self> {
        if short_window == 0 {
            return Err(AnalyticsError::InvalidWindowSize(short_window));
        }
        if long_window == 0 {
            return Err(AnalyticsError::InvalidWindowSize(long_window));
        }
        Ok(Self {
            short_window,
            long_window,
            top_k,
        })
    }

    /// Rise score for every entity in the store, in entity order
    pub fn scores(&self, store: &TimeSeriesStore) -> AnalyticsResult<Vec<RiseScore>> {
        store
            .iter()
            .map(|(entity, series)| {
                let short_ma = latest_moving_average(series, self.short_window)?;
                let long_ma = latest_moving_average(series, self.long_window)?;
                Ok(RiseScore {
                    entity: entity.to_string(),
                    short_ma,
                    long_ma,
                    score: rise_score(short_ma, long_ma),
                })
            })
            .collect()
    }

    /// Top movers by rise score, descending; undefined scores are excluded
    pub fn rank(&self, store: &TimeSeriesStore) -> AnalyticsResult<Vec<RisingEntity>> {
        let defined = self
            .scores(store)?
            .into_iter()
            .filter_map(|s| {
                s.score.map(|rise_score| RisingEntity {
                    entity: s.entity,
                    rise_score,
                })
            })
            .collect();

        Ok(top_k(defined, SortOrder::Descending, self.top_k))
    }
}

impl Default for MomentumRanker {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            top_k: super::DEFAULT_TOP_K,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawObservation;
    use chrono::{Duration, NaiveDate};

    fn store_from(series: &[(&str, Vec<f64>)]) -> TimeSeriesStore {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let raw = series.iter().flat_map(|(entity, ratios)| {
            ratios.iter().enumerate().map(move |(i, &r)| {
                let date = start + Duration::days(i as i64);
                RawObservation::new(*entity, date.format("%Y-%m-%d").to_string(), r)
            })
        });
        TimeSeriesStore::ingest(raw.collect::<Vec<_>>()).unwrap().0
    }

    #[test]
    fn test_rise_score_fixture() {
        assert_eq!(rise_score(Some(80.0), Some(50.0)), Some(60.0));
    }

    #[test]
    fn test_rise_score_undefined() {
        assert_eq!(rise_score(None, Some(50.0)), None);
        assert_eq!(rise_score(Some(1.0), None), None);
        assert_eq!(rise_score(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn test_short_history_excluded_from_ranking() {
        let store = store_from(&[
            ("long", (1..=30).map(f64::from).collect()),
            ("short", vec![100.0; 10]),
        ]);
        let ranker = MomentumRanker::default();

        let scores = ranker.scores(&store).unwrap();
        let short = scores.iter().find(|s| s.entity == "short").unwrap();
        assert!(short.short_ma.is_some());
        assert!(short.long_ma.is_none());
        assert!(short.score.is_none());

        let ranked = ranker.rank(&store).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entity, "long");
        assert!((ranked[0].rise_score - 63.64).abs() < 1e-9);
    }

    #[test]
    fn test_near_zero_scores_tie_by_key() {
        let mut dipping = vec![100.0; 28];
        dipping[27] = 99.99;
        let store = store_from(&[("b", vec![10.0; 28]), ("a", dipping)]);

        let ranked = MomentumRanker::default().rank(&store).unwrap();
        let keys: Vec<&str> = ranked.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(ranked[0].rise_score.is_sign_positive());

        let json = serde_json::to_string(&ranked[0]).unwrap();
        assert!(json.contains(r#""rise_score":0.0"#));
    }

    #[test]
    fn test_zero_long_average_excluded() {
        let store = store_from(&[("flat", vec![0.0; 30])]);
        assert!(MomentumRanker::default().rank(&store).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_windows() {
        assert!(MomentumRanker::new(0, 28, 5).is_err());
        assert!(MomentumRanker::new(7, 0, 5).is_err());
    }
}
