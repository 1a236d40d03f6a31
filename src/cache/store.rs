//! In-memory query store
//!
//! Provides a `QueryStore` that caches fetched records per [`QueryKey`], runs
//! fetchers with a bounded retry, and publishes every state transition on a
//! watch channel so consumers can observe it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::key::QueryKey;
use super::state::{AnyData, QueryState, QueryStatus, RawState};
use crate::api::{error_message, TransportError};

/// Default eviction horizon for unused entries (24 hours)
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Default number of retries after a failed attempt
pub const DEFAULT_RETRY: u32 = 1;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Cache and retry policy
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// How long data stays fresh; `None` means forever
    pub stale_time: Option<Duration>,
    /// How long an entry without consumers is kept before it may be purged
    pub gc_time: Duration,
    /// Extra attempts after the first failure
    pub retry: u32,
    /// Pause between attempts
    pub retry_delay: Duration,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: None,
            gc_time: DEFAULT_GC_TIME,
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// One cached entry
pub(crate) struct Entry {
    /// Publishes the entry's state to subscribers
    pub tx: watch::Sender<RawState>,
    /// Issuance number of the authoritative request
    pub generation: u64,
    /// Live subscriptions
    pub observers: usize,
    /// Last time the entry was read, written or unsubscribed from
    pub last_used: DateTime<Utc>,
}

impl Entry {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        let (tx, _) = watch::channel(RawState::inactive());
        Self {
            tx,
            generation: 0,
            observers: 0,
            last_used: now,
        }
    }

    pub fn snapshot(&self) -> RawState {
        self.tx.borrow().clone()
    }
}

pub(crate) struct StoreInner {
    pub config: QueryConfig,
    pub entries: Mutex<HashMap<QueryKey, Entry>>,
}

/// What `fetch` decided to do after inspecting the entry
enum Plan {
    Hit(RawState),
    Wait(watch::Receiver<RawState>),
    Run(u64),
}

/// Client-side cache of query results
///
/// Cheap to clone; clones share the same entries. Create one per session and
/// drop it (or call [`QueryStore::clear`]) at shutdown.
#[derive(Clone)]
pub struct QueryStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl Default for QueryStore {
    fn default() -> Self {
        Self::new(QueryConfig::default())
    }
}

impl QueryStore {
    /// Creates an empty store with the given policy
    pub fn new(config: QueryConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether an entry exists for the key
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Current state of an entry; missing entries are inactive
    pub fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        self.lock()
            .get(key)
            .map(|entry| QueryState::from_raw(&entry.snapshot()))
            .unwrap_or_else(QueryState::inactive)
    }

    /// Returns cached data for the key, fetching it if missing or stale
    ///
    /// A fresh `Ready` entry is returned without calling `fetcher`. If a
    /// request for the key is already in flight, this waits for it instead of
    /// issuing another.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let plan = {
            let now = Utc::now();
            let mut entries = self.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(now));
            entry.last_used = now;
            let current = entry.snapshot();

            match current.status {
                QueryStatus::Ready if !self.is_stale(&current, now) => Plan::Hit(current),
                QueryStatus::Loading => Plan::Wait(entry.tx.subscribe()),
                _ => Plan::Run(begin_request(entry)),
            }
        };

        match plan {
            Plan::Hit(raw) => {
                debug!(key = %key, "cache hit");
                QueryState::from_raw(&raw)
            }
            Plan::Wait(rx) => {
                debug!(key = %key, "joining in-flight request");
                wait_settled(rx).await
            }
            Plan::Run(generation) => {
                debug!(key = %key, generation, "cache miss");
                self.run(key, generation, fetcher).await
            }
        }
    }

    /// Fetches the key again regardless of freshness
    ///
    /// Supersedes any request already in flight for the key; that request's
    /// result will be discarded.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let generation = {
            let now = Utc::now();
            let mut entries = self.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(now));
            entry.last_used = now;
            begin_request(entry)
        };

        debug!(key = %key, generation, "refetch");
        self.run(key, generation, fetcher).await
    }

    /// Abandons the in-flight request for the key, if any
    ///
    /// The entry goes back to `Ready` when it still holds data, otherwise to
    /// `Inactive`. A late result of the abandoned request is discarded.
    pub fn cancel(&self, key: &QueryKey) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        if abandon_request(entry) {
            debug!(key = %key, "request cancelled");
        }
    }

    /// Reverts the entry if `generation` is still the one in flight
    pub(crate) fn abandon(&self, key: &QueryKey, generation: u64) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation == generation && abandon_request(entry) {
            debug!(key = %key, generation, "request dropped before it settled");
        }
    }

    /// Removes a single entry
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Drops every entry; pending requests will find nothing to write to
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Runs the fetcher with retry and writes the outcome if still current
    async fn run<T, F, Fut>(&self, key: QueryKey, generation: u64, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let guard = RequestGuard::new(self, &key, generation);
        let outcome = self
            .attempt_with_retry(&key, generation, fetcher)
            .await
            .map(|data| Arc::new(data) as AnyData);
        guard.disarm();
        self.settle(&key, generation, outcome)
    }

    /// Calls the fetcher up to `1 + retry` times
    ///
    /// Stops early if the request is superseded between attempts.
    pub(crate) async fn attempt_with_retry<T, F, Fut>(
        &self,
        key: &QueryKey,
        generation: u64,
        mut fetcher: F,
    ) -> Result<T, String>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let attempts = self.inner.config.retry.saturating_add(1);
        let mut attempt = 1;

        loop {
            match fetcher().await {
                Ok(data) => return Ok(data),
                Err(err) => {
                    warn!(key = %key, attempt, error = %err, "query attempt failed");
                    if attempt >= attempts || !self.is_current(key, generation) {
                        return Err(error_message(&err));
                    }
                }
            }

            attempt += 1;
            let delay = self.inner.config.retry_delay;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Writes a finished request into its entry unless it was superseded
    fn settle<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        generation: u64,
        outcome: Result<AnyData, String>,
    ) -> QueryState<T> {
        let now = Utc::now();
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            debug!(key = %key, "entry removed before request finished");
            return QueryState::inactive();
        };

        if entry.generation != generation {
            debug!(key = %key, generation, current = entry.generation, "discarding superseded result");
            return QueryState::from_raw(&entry.snapshot());
        }

        entry.last_used = now;
        entry.tx.send_modify(|state| {
            match outcome {
                Ok(data) => {
                    state.status = QueryStatus::Ready;
                    state.data = Some(data);
                    state.error = None;
                    state.updated_at = Some(now);
                }
                Err(message) => {
                    state.status = QueryStatus::Failed;
                    state.error = Some(message);
                }
            }
            state.fetching_more = false;
        });
        QueryState::from_raw(&entry.snapshot())
    }

    /// Whether the generation is still the authoritative one for the key
    pub(crate) fn is_current(&self, key: &QueryKey, generation: u64) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|entry| entry.generation == generation)
    }

    fn is_stale(&self, state: &RawState, now: DateTime<Utc>) -> bool {
        let Some(stale_time) = self.inner.config.stale_time else {
            return false;
        };
        match (state.updated_at, chrono::Duration::from_std(stale_time)) {
            (Some(updated_at), Ok(stale_time)) => now - updated_at >= stale_time,
            (None, _) => true,
            (Some(_), Err(_)) => false,
        }
    }
}

/// Invalidates the in-flight request and restores the last settled state
///
/// A loading entry goes back to `Ready` when it still holds data, otherwise
/// to `Inactive`. Returns `false` when nothing was in flight.
fn abandon_request(entry: &mut Entry) -> bool {
    let current = entry.snapshot();
    if current.status != QueryStatus::Loading && !current.fetching_more {
        return false;
    }

    entry.generation += 1;
    entry.tx.send_modify(|state| {
        if state.status == QueryStatus::Loading {
            state.status = if state.data.is_some() {
                QueryStatus::Ready
            } else {
                QueryStatus::Inactive
            };
        }
        state.fetching_more = false;
    });
    true
}

/// Abandons a request whose future is dropped before it settles
pub(crate) struct RequestGuard<'a> {
    store: &'a QueryStore,
    key: &'a QueryKey,
    generation: u64,
    armed: bool,
}

impl<'a> RequestGuard<'a> {
    pub(crate) fn new(store: &'a QueryStore, key: &'a QueryKey, generation: u64) -> Self {
        Self {
            store,
            key,
            generation,
            armed: true,
        }
    }

    /// The request finished; its outcome will be settled normally
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abandon(self.key, self.generation);
        }
    }
}

/// Marks the entry as loading under a fresh generation and returns it
fn begin_request(entry: &mut Entry) -> u64 {
    entry.generation += 1;
    entry.tx.send_modify(|state| {
        state.status = QueryStatus::Loading;
        state.error = None;
        state.fetching_more = false;
    });
    entry.generation
}

/// Waits until an entry leaves the `Loading` state
async fn wait_settled<T: Send + Sync + 'static>(mut rx: watch::Receiver<RawState>) -> QueryState<T> {
    match rx.wait_for(|state| state.status != QueryStatus::Loading).await {
        Ok(state) => QueryState::from_raw(&state),
        Err(_) => QueryState::inactive(),
    }
}
