//! Monthly seasonality aggregation

use super::round2;
use super::store::TimeSeriesStore;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Calendar month bucket, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mean ratio of one entity within one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMean {
    pub month: YearMonth,
    pub mean_ratio: f64,
    pub observations: usize,
}

/// Per-entity monthly means, computed once from a store
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SeasonalAggregator {
    by_entity: BTreeMap<String, Vec<MonthlyMean>>,
}

impl SeasonalAggregator {
    /// Group every entity's observations by year-month and average them
    #[must_use]
    pub fn from_store(store: &TimeSeriesStore) -> Self {
        let by_entity = store
            .iter()
            .map(|(entity, series)| {
                let mut buckets: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
                for point in series {
                    let bucket = buckets.entry(YearMonth::of(point.date)).or_insert((0.0, 0));
                    bucket.0 += point.ratio;
                    bucket.1 += 1;
                }

                let months = buckets
                    .into_iter()
                    .map(|(month, (sum, count))| MonthlyMean {
                        month,
                        mean_ratio: round2(sum / count as f64),
                        observations: count,
                    })
                    .collect();

                (entity.to_string(), months)
            })
            .collect();

        Self { by_entity }
    }

    /// Chronological monthly means for one entity (empty if unknown)
    #[must_use]
    pub fn series_for(&self, entity: &str) -> &[MonthlyMean] {
        self.by_entity.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entities(&self) -> impl Iterator<Item = &str> {
        self.by_entity.keys().map(String::as_str)
    }
}
