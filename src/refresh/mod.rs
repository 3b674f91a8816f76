//! Refresh cycle and published snapshot
//!
//! One refresh fetches every registered entity, builds a brand-new
//! [`TimeSeriesStore`], runs the analytics and swaps the result into a
//! [`SnapshotHandle`]. Readers hold an `Arc<Snapshot>` and never observe a
//! partially built store. A failed refresh leaves the previous snapshot in
//! place.

use crate::analytics::{DuplicateObservation, TimeSeriesStore, TrendReport};
use crate::config::Config;
use crate::error::{Error, GemtrendErrorTrait, Result};
use crate::metrics;
use crate::models::RawObservation;
use crate::source::{fetch_all, DateRange, TrendSource};
use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

/// Immutable result of one successful refresh
#[derive(Debug)]
pub struct Snapshot {
    pub store: TimeSeriesStore,
    pub report: TrendReport,
    pub duplicates: Vec<DuplicateObservation>,
    pub range: DateRange,
    pub refreshed_at: DateTime<Utc>,
}

/// Shared pointer to the currently published snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotHandle {
    current: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot
    pub async fn publish(&self, snapshot: Arc<Snapshot>) {
        let mut slot = self.current.write().await;
        *slot = Some(snapshot);
    }

    /// The published snapshot, if any refresh has succeeded yet
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }
}

/// Build a snapshot from already-fetched observations
///
/// # Errors
///
/// Fails on malformed observations or invalid analytics windows.
pub fn build_snapshot(
    observations: Vec<RawObservation>,
    range: DateRange,
    config: &Config,
) -> Result<Snapshot> {
    let (store, duplicates) = TimeSeriesStore::ingest(observations)?;
    let report = TrendReport::build(&store, &config.analytics)?;

    Ok(Snapshot {
        store,
        report,
        duplicates,
        range,
        refreshed_at: Utc::now(),
    })
}

/// Drives refresh cycles against a trend source
pub struct Refresher<S: TrendSource> {
    source: S,
    config: Config,
    handle: SnapshotHandle,
}

impl<S: TrendSource> Refresher<S> {
    pub fn new(source: S, config: Config, handle: SnapshotHandle) -> Self {
        Self {
            source,
            config,
            handle,
        }
    }

    pub fn handle(&self) -> &SnapshotHandle {
        &self.handle
    }

    /// Run one refresh ending at `today` and publish it
    ///
    /// # Errors
    ///
    /// Upstream and ingestion failures are returned unchanged; the previously
    /// published snapshot stays in effect.
    pub async fn refresh_once(&self, today: NaiveDate) -> Result<Arc<Snapshot>> {
        let started = Instant::now();
        let result = self.build(today).await;
        let elapsed = started.elapsed();

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.handle.publish(Arc::clone(&snapshot)).await;

                metrics::record_refresh("success", elapsed.as_secs_f64());
                metrics::record_duplicates(snapshot.duplicates.len());
                metrics::set_tracked_entities(snapshot.store.len());

                info!(
                    entities = snapshot.store.len(),
                    observations = snapshot.store.observation_count(),
                    duplicates = snapshot.duplicates.len(),
                    elapsed_ms = elapsed.as_millis(),
                    "Snapshot published"
                );
                Ok(snapshot)
            }
            Err(e) => {
                metrics::record_refresh("failure", elapsed.as_secs_f64());
                metrics::record_refresh_failure(e.category().as_str());
                error!(
                    error = %e,
                    category = e.category().as_str(),
                    recoverable = e.is_recoverable(),
                    "Refresh failed; keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn build(&self, today: NaiveDate) -> Result<Snapshot> {
        let range = DateRange::lookback(today, self.config.analytics.lookback_days);
        let observations = fetch_all(
            &self.source,
            &self.config.entities,
            range,
            self.config.source.max_group_size,
        )
        .await
        .map_err(Error::from)?;

        build_snapshot(observations, range, &self.config)
    }

    /// Refresh on every interval tick until `shutdown` flips to `true`
    ///
    /// The first refresh runs immediately. Failures are logged and retried
    /// at the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.refresh_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let today = Local::now().date_naive();
                    if let Err(e) = self.refresh_once(today).await {
                        if e.is_recoverable() {
                            warn!(error = %e, "Will retry at next scheduled refresh");
                        } else {
                            warn!(
                                error = %e,
                                category = e.category().as_str(),
                                "Refresh failed with a non-recoverable error; \
                                 check configuration and credentials"
                            );
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Refresh loop stopping");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_handle_starts_empty() {
        let handle = SnapshotHandle::new();
        assert!(tokio_test::block_on(handle.current()).is_none());
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let handle = SnapshotHandle::new();
        let config = Config::default();
        let range = DateRange::lookback(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 1);

        let first = build_snapshot(
            vec![RawObservation::new("a", "2024-01-01", 1.0)],
            range,
            &config,
        )
        .unwrap();
        let second = build_snapshot(
            vec![
                RawObservation::new("a", "2024-01-01", 1.0),
                RawObservation::new("b", "2024-01-02", 2.0),
            ],
            range,
            &config,
        )
        .unwrap();

        tokio_test::block_on(async {
            handle.publish(Arc::new(first)).await;
            let reader = handle.current().await.unwrap();

            handle.publish(Arc::new(second)).await;

            // An earlier reader keeps its own consistent view
            assert_eq!(reader.store.len(), 1);
            assert_eq!(handle.current().await.unwrap().store.len(), 2);
        });
    }

    #[test]
    fn test_build_snapshot_rejects_malformed() {
        let config = Config::default();
        let range = DateRange::lookback(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 1);
        let result = build_snapshot(
            vec![RawObservation::new("a", "2024-01-01", -5.0)],
            range,
            &config,
        );
        assert!(result.is_err());
    }
}
