//! Write-behind persistence for the social store.
//!
//! The worker snapshots the store on a fixed interval and once more when the
//! shutdown signal fires. Record store writes run on the blocking pool so the
//! async runtime never stalls on disk I/O.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::ports::{FlushReport, RecordStore, RecordStoreError};
use super::social_store::SocialStore;

/// Periodically persists a [`SocialStore`] through a [`RecordStore`].
pub struct FlushWorker {
    store: Arc<SocialStore>,
    records: Arc<dyn RecordStore>,
    interval: Duration,
}

impl FlushWorker {
    pub fn new(
        store: Arc<SocialStore>,
        records: Arc<dyn RecordStore>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            records,
            interval,
        }
    }

    /// Snapshot the store and write it out.
    ///
    /// # Errors
    ///
    /// Returns the record store error when the data directory is unusable.
    /// Per-user write failures are counted in the report instead.
    pub async fn flush_once(&self) -> Result<FlushReport, RecordStoreError> {
        let snapshot = self.store.snapshot();
        let records = Arc::clone(&self.records);
        let users = snapshot.len();
        let report = tokio::task::spawn_blocking(move || records.save(&snapshot))
            .await
            .map_err(|err| RecordStoreError::unavailable(format!("flush task failed: {err}")))??;

        if report.failed > 0 {
            warn!(users, written = report.written, failed = report.failed, "flush incomplete");
        } else {
            debug!(users, written = report.written, "flushed user records");
        }
        Ok(report)
    }

    /// Flush every interval until `shutdown` resolves, then flush once more.
    pub async fn run<S>(self, shutdown: S)
    where
        S: Future<Output = ()> + Send,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing has changed yet.
        ticker.tick().await;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.flush_once().await {
                        error!(error = %err, "periodic flush failed");
                    }
                }
            }
        }

        match self.flush_once().await {
            Ok(report) => info!(written = report.written, failed = report.failed, "final flush complete"),
            Err(err) => error!(error = %err, "final flush failed"),
        }
    }
}
