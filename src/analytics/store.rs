//! Immutable per-refresh container of daily observations
//!
//! A [`TimeSeriesStore`] is built once per refresh cycle from the raw
//! observations delivered by a trend source and never mutated afterwards.
//! All analytics in this module are pure functions over it.

use super::error::{AnalyticsError, AnalyticsResult};
use crate::models::{RawObservation, SeriesPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Date format accepted from trend sources
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A same-entity/same-date observation that was dropped in favour of the
/// first occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateObservation {
    pub entity: String,
    pub date: NaiveDate,

    /// Ratio that was kept (first seen)
    pub kept_ratio: f64,

    /// Ratio that was dropped
    pub dropped_ratio: f64,
}

/// Per-entity, date-ordered series
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeSeriesStore {
    series: BTreeMap<String, Vec<SeriesPoint>>,
}

impl TimeSeriesStore {
    /// Validate and freeze a batch of observations
    ///
    /// Returns the store together with every duplicate that was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::MalformedObservation`] on the first
    /// observation whose date cannot be parsed or whose ratio is negative or
    /// not finite. Nothing is returned in that case.
    pub fn ingest<I>(observations: I) -> AnalyticsResult<(Self, Vec<DuplicateObservation>)>
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let mut by_entity: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        let mut duplicates = Vec::new();

        for raw in observations {
            let date = NaiveDate::parse_from_str(raw.date.trim(), DATE_FORMAT).map_err(|e| {
                AnalyticsError::malformed(&raw.entity, &raw.date, format!("unparsable date: {e}"))
            })?;

            if !raw.ratio.is_finite() {
                return Err(AnalyticsError::malformed(
                    &raw.entity,
                    &raw.date,
                    "ratio is not a finite number",
                ));
            }
            if raw.ratio < 0.0 {
                return Err(AnalyticsError::malformed(
                    &raw.entity,
                    &raw.date,
                    format!("negative ratio {}", raw.ratio),
                ));
            }

            let points = by_entity.entry(raw.entity.clone()).or_default();

            match points.entry(date) {
                Entry::Vacant(slot) => {
                    // -0.0 passes the sign check; store it as 0.0
                    slot.insert(raw.ratio + 0.0);
                }
                Entry::Occupied(slot) => duplicates.push(DuplicateObservation {
                    entity: raw.entity,
                    date,
                    kept_ratio: *slot.get(),
                    dropped_ratio: raw.ratio,
                }),
            }
        }

        let series: BTreeMap<String, Vec<SeriesPoint>> = by_entity
            .into_iter()
            .map(|(entity, points)| {
                let points = points
                    .into_iter()
                    .map(|(date, ratio)| SeriesPoint { date, ratio })
                    .collect();
                (entity, points)
            })
            .collect();

        for dup in &duplicates {
            warn!(
                entity = %dup.entity,
                date = %dup.date,
                kept = dup.kept_ratio,
                dropped = dup.dropped_ratio,
                "Duplicate observation dropped"
            );
        }

        let store = Self { series };
        debug!(
            entities = store.len(),
            observations = store.observation_count(),
            duplicates = duplicates.len(),
            "Time series store built"
        );

        Ok((store, duplicates))
    }

    /// Ordered series for an entity (empty if unknown)
    #[must_use]
    pub fn series_for(&self, entity: &str) -> &[SeriesPoint] {
        self.series.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entity keys in ascending order
    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Iterate `(entity, series)` pairs in entity order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SeriesPoint])> {
        self.series
            .iter()
            .map(|(entity, points)| (entity.as_str(), points.as_slice()))
    }

    /// Most recent observation of an entity
    #[must_use]
    pub fn latest(&self, entity: &str) -> Option<SeriesPoint> {
        self.series.get(entity).and_then(|points| points.last().copied())
    }

    #[must_use]
    pub fn contains(&self, entity: &str) -> bool {
        self.series.contains_key(entity)
    }

    /// Number of entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of observations across all entities
    #[must_use]
    pub fn observation_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Earliest and latest date across all entities
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.series.values().filter_map(|p| p.first()).map(|p| p.date).min()?;
        let last = self.series.values().filter_map(|p| p.last()).map(|p| p.date).max()?;
        Some((first, last))
    }
}
