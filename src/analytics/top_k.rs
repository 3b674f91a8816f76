//! Deterministic top-k selection shared by every ranking

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction for a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// An item that can be ranked: an entity key plus a defined score
pub trait Ranked {
    fn entity(&self) -> &str;
    fn score(&self) -> f64;
}

/// Select at most `k` items ordered by score
///
/// Ties are broken by entity key ascending regardless of `order`, so the
/// result never depends on input order. Scores are finite, and `0.0` and
/// `-0.0` compare equal.
#[must_use]
pub fn top_k<T: Ranked>(mut items: Vec<T>, order: SortOrder, k: usize) -> Vec<T> {
    items.sort_by(|a, b| {
        let by_score = match order {
            SortOrder::Ascending => a.score().partial_cmp(&b.score()),
            SortOrder::Descending => b.score().partial_cmp(&a.score()),
        };
        match by_score.unwrap_or(Ordering::Equal) {
            Ordering::Equal => a.entity().cmp(b.entity()),
            other => other,
        }
    });
    items.truncate(k);
    items
}
