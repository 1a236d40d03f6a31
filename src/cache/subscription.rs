//! Observing cache entries
//!
//! A subscription is a live consumer of an entry. While at least one exists
//! the entry is never purged; dropping the last one starts the entry's
//! eviction window.

use chrono::Utc;
use std::marker::PhantomData;
use std::sync::Weak;
use tokio::sync::watch;

use super::key::QueryKey;
use super::state::{QueryState, RawState};
use super::store::{Entry, QueryStore, StoreInner};

/// Receives every state transition of one cache entry
pub struct Subscription<T> {
    key: QueryKey,
    rx: watch::Receiver<RawState>,
    store: Weak<StoreInner>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    /// The key being observed
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest state without waiting
    pub fn current(&self) -> QueryState<T> {
        QueryState::from_raw(&self.rx.borrow())
    }

    /// Waits for the next state transition
    ///
    /// Returns `None` once the entry has been removed from the store.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.rx.changed().await.ok()?;
        Some(QueryState::from_raw(&self.rx.borrow_and_update()))
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let store = QueryStore { inner };
        let mut entries = store.lock();
        // A removed and recreated entry has a new channel; leave its count alone
        let Some(entry) = entries
            .get_mut(&self.key)
            .filter(|entry| entry.tx.subscribe().same_channel(&self.rx))
        else {
            return;
        };
        entry.observers = entry.observers.saturating_sub(1);
        entry.last_used = Utc::now();
    }
}

impl QueryStore {
    /// Subscribes to an entry, creating it in the `Inactive` state if needed
    pub fn subscribe<T: Send + Sync + 'static>(&self, key: QueryKey) -> Subscription<T> {
        let now = Utc::now();
        let mut entries = self.lock();
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| Entry::new(now));
        entry.observers += 1;
        entry.last_used = now;

        Subscription {
            key,
            rx: entry.tx.subscribe(),
            store: std::sync::Arc::downgrade(&self.inner),
            _marker: PhantomData,
        }
    }

    /// Number of live subscriptions on an entry
    pub fn observer_count(&self, key: &QueryKey) -> usize {
        self.lock().get(key).map_or(0, |entry| entry.observers)
    }
}
