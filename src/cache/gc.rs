//! Eviction of unused cache entries
//!
//! Entries with no live subscriptions are kept for the configured `gc_time`
//! after their last use. A background task can sweep them periodically.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::state::QueryStatus;
use super::store::QueryStore;

impl QueryStore {
    /// Removes entries that have been unused for longer than `gc_time`
    ///
    /// Entries with live subscriptions or an in-flight request are kept.
    /// Returns the number of entries removed.
    pub fn purge_unused_at(&self, now: DateTime<Utc>) -> usize {
        let Ok(horizon) = chrono::Duration::from_std(self.config().gc_time) else {
            return 0;
        };

        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            let state = entry.snapshot();
            entry.observers > 0
                || state.status == QueryStatus::Loading
                || state.fetching_more
                || now - entry.last_used <= horizon
        });
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, remaining = entries.len(), "purged unused cache entries");
        }
        purged
    }

    /// Removes entries that are unused as of now
    pub fn purge_unused(&self) -> usize {
        self.purge_unused_at(Utc::now())
    }

    /// Spawns a task that purges unused entries on every `interval`
    ///
    /// The task holds only a weak reference and stops by itself once the
    /// store is dropped.
    pub fn spawn_gc(&self, interval: Duration) -> GcHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let store = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skip the first tick (immediate)
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(inner) = store.upgrade() else {
                            break;
                        };
                        QueryStore { inner }.purge_unused();
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        GcHandle { shutdown_tx, task }
    }
}

/// Handle for stopping the background eviction task
pub struct GcHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl GcHandle {
    /// Stops the task and waits for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}
