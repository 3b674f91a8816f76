//! Refresh cycle tests against an in-memory trend source

mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{daily_series, ramp, registry_of};
use gemtrend::config::Config;
use gemtrend::error::{ErrorCategory, GemtrendErrorTrait};
use gemtrend::models::{KeywordGroup, RawObservation};
use gemtrend::refresh::{Refresher, SnapshotHandle};
use gemtrend::source::{DateRange, SourceError, SourceResult, TrendSource};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Answers every group with a 30-day ramp, or fails while `failing` is set
#[derive(Clone, Default)]
struct ScriptedSource {
    failing: Arc<AtomicBool>,
    malformed: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
}

#[async_trait]
impl TrendSource for ScriptedSource {
    async fn fetch_batch(
        &self,
        groups: &[KeywordGroup],
        _range: DateRange,
    ) -> SourceResult<Vec<RawObservation>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::ServerError(503));
        }

        let mut observations: Vec<RawObservation> = groups
            .iter()
            .flat_map(|g| daily_series(&g.name, &ramp(30)))
            .collect();
        if self.malformed.load(Ordering::SeqCst) {
            observations.push(RawObservation::new("broken", "yesterday", 1.0));
        }
        Ok(observations)
    }
}

fn test_config(entities: &[&str]) -> Config {
    Config {
        entities: registry_of(entities),
        ..Config::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 30).unwrap()
}

#[tokio::test]
async fn test_refresh_publishes_snapshot() {
    let source = ScriptedSource::default();
    let handle = SnapshotHandle::new();
    let refresher = Refresher::new(
        source.clone(),
        test_config(&["a", "b", "c", "d", "e", "f"]),
        handle.clone(),
    );

    assert!(handle.current().await.is_none());
    let snapshot = refresher.refresh_once(today()).await.unwrap();

    assert_eq!(source.requests.load(Ordering::SeqCst), 2);
    assert_eq!(snapshot.store.len(), 6);
    assert_eq!(snapshot.report.rising.len(), 5);
    assert_eq!(snapshot.range.end, today());
    assert_eq!(snapshot.range.start, NaiveDate::from_ymd_opt(2023, 1, 30).unwrap());

    let published = handle.current().await.unwrap();
    assert!(Arc::ptr_eq(&published, &snapshot));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let source = ScriptedSource::default();
    let handle = SnapshotHandle::new();
    let refresher = Refresher::new(source.clone(), test_config(&["a", "b"]), handle.clone());

    let first = refresher.refresh_once(today()).await.unwrap();

    source.failing.store(true, Ordering::SeqCst);
    let err = refresher.refresh_once(today()).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.is_recoverable());

    let current = handle.current().await.unwrap();
    assert!(Arc::ptr_eq(&current, &first));
}

#[tokio::test]
async fn test_malformed_observation_aborts_refresh() {
    let source = ScriptedSource::default();
    source.malformed.store(true, Ordering::SeqCst);
    let handle = SnapshotHandle::new();
    let refresher = Refresher::new(source.clone(), test_config(&["a"]), handle.clone());

    let err = refresher.refresh_once(today()).await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Ingestion);
    assert!(!err.is_recoverable());
    assert!(handle.current().await.is_none());
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let source = ScriptedSource::default();
    let handle = SnapshotHandle::new();
    let refresher = Arc::new(Refresher::new(
        source.clone(),
        test_config(&["a"]),
        handle.clone(),
    ));

    let (tx, rx) = tokio::sync::watch::channel(false);
    let task = {
        let refresher = Arc::clone(&refresher);
        tokio::spawn(async move { refresher.run(rx).await })
    };

    // first tick fires immediately
    for _ in 0..100 {
        if handle.current().await.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(handle.current().await.is_some());

    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), task)
        .await
        .expect("refresh loop should stop")
        .unwrap();
}
