//! Common test utilities

use chrono::{Duration, NaiveDate};
use gemtrend::models::{EntityRegistry, RawObservation};

/// First day of every generated series
#[allow(dead_code)]
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Consecutive daily observations starting at `start_date()`
#[allow(dead_code)]
pub fn daily_series(entity: &str, ratios: &[f64]) -> Vec<RawObservation> {
    ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| {
            let date = start_date() + Duration::days(i as i64);
            RawObservation::new(entity, date.format("%Y-%m-%d").to_string(), *ratio)
        })
        .collect()
}

/// Ratios 1.0, 2.0, ..., n
#[allow(dead_code)]
pub fn ramp(n: usize) -> Vec<f64> {
    (1..=n).map(|v| v as f64).collect()
}

/// Registry with one alias per entity
#[allow(dead_code)]
pub fn registry_of(entities: &[&str]) -> EntityRegistry {
    let mut registry = EntityRegistry::new();
    for entity in entities {
        registry.insert(*entity, vec![(*entity).to_string()]);
    }
    registry
}

/// Two-entity snapshot used by the market share examples
#[allow(dead_code)]
pub fn pearl_ruby_fixture() -> Vec<RawObservation> {
    vec![
        RawObservation::new("진주", "2024-01-01", 30.0),
        RawObservation::new("루비", "2024-01-01", 70.0),
    ]
}
