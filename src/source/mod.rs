//! Trend data sources
//!
//! A [`TrendSource`] answers one provider request: a batch of keyword groups
//! over a date range. [`fetch_all`] splits an [`EntityRegistry`] into batches
//! that respect the provider's group limit and concatenates the results.

pub mod error;
pub mod naver;

pub use error::{SourceError, SourceResult};
pub use naver::NaverDataLabClient;

use crate::models::{EntityRegistry, KeywordGroup, RawObservation};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

/// Inclusive date range requested from a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> SourceResult<Self> {
        if start > end {
            return Err(SourceError::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// `[end - days, end]`
    #[must_use]
    pub fn lookback(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }
}

/// A provider of daily search-interest series
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch one batch of keyword groups. Observations are keyed by the
    /// group's canonical name.
    async fn fetch_batch(
        &self,
        groups: &[KeywordGroup],
        range: DateRange,
    ) -> SourceResult<Vec<RawObservation>>;
}

/// Fetch every registered entity, `max_group_size` groups per request
///
/// Any failed batch fails the whole fetch.
pub async fn fetch_all<S>(
    source: &S,
    registry: &EntityRegistry,
    range: DateRange,
    max_group_size: usize,
) -> SourceResult<Vec<RawObservation>>
where
    S: TrendSource + ?Sized,
{
    let batches = registry.groups(max_group_size);
    let mut observations = Vec::new();

    for (index, batch) in batches.iter().enumerate() {
        let fetched = source.fetch_batch(batch, range).await?;
        debug!(
            batch = index,
            groups = batch.len(),
            observations = fetched.len(),
            "Fetched trend batch"
        );
        observations.extend(fetched);
    }

    info!(
        batches = batches.len(),
        entities = registry.len(),
        observations = observations.len(),
        start = %range.start,
        end = %range.end,
        "Fetched trend data"
    );

    Ok(observations)
}
