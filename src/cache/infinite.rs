//! Incremental ("infinite") pagination on top of the query store
//!
//! The entry holds every page fetched so far. Asking for more derives the next
//! page number from the last page's `next` URL and appends the result.

use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::key::QueryKey;
use super::state::{AnyData, QueryState, QueryStatus};
use super::store::{QueryStore, RequestGuard};
use crate::api::TransportError;
use crate::data::{next_page_cursor, Page};

/// Pages accumulated by an incremental listing, in fetch order
#[derive(Debug)]
pub struct InfinitePages<T> {
    pages: Vec<Arc<Page<T>>>,
}

impl<T> InfinitePages<T> {
    /// Starts an accumulation from the first page
    pub fn first(page: Page<T>) -> Self {
        Self {
            pages: vec![Arc::new(page)],
        }
    }

    /// Returns a copy with one more page at the end
    fn appended(&self, page: Page<T>) -> Self {
        let mut pages = self.pages.clone();
        pages.push(Arc::new(page));
        Self { pages }
    }

    pub fn pages(&self) -> &[Arc<Page<T>>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All records across pages, in order
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.results.iter())
    }

    /// Whether the last page reports a next page
    pub fn has_more(&self) -> bool {
        self.pages.last().is_some_and(|page| page.next.is_some())
    }

    /// Page number to request next, if any
    pub fn next_cursor(&self) -> Option<u32> {
        self.pages
            .last()
            .and_then(|page| next_page_cursor(page.next.as_deref()))
    }
}

impl<T> QueryState<InfinitePages<T>> {
    /// Whether another page can be requested
    pub fn has_more(&self) -> bool {
        self.data.as_ref().is_some_and(|pages| pages.has_more())
    }
}

impl QueryStore {
    /// Loads the first page of an incremental listing
    ///
    /// Follows the same caching rules as [`QueryStore::fetch`]; once loaded the
    /// accumulated pages are returned as they are.
    pub async fn fetch_infinite<T, F, Fut>(
        &self,
        key: QueryKey,
        mut fetcher: F,
    ) -> QueryState<InfinitePages<T>>
    where
        T: Send + Sync + 'static,
        F: FnMut(Option<u32>) -> Fut,
        Fut: Future<Output = Result<Page<T>, TransportError>>,
    {
        self.fetch(key, move || {
            let request = fetcher(None);
            async move { request.await.map(InfinitePages::first) }
        })
        .await
    }

    /// Drops accumulated pages and reloads from the first page
    pub async fn refetch_infinite<T, F, Fut>(
        &self,
        key: QueryKey,
        mut fetcher: F,
    ) -> QueryState<InfinitePages<T>>
    where
        T: Send + Sync + 'static,
        F: FnMut(Option<u32>) -> Fut,
        Fut: Future<Output = Result<Page<T>, TransportError>>,
    {
        self.refetch(key, move || {
            let request = fetcher(None);
            async move { request.await.map(InfinitePages::first) }
        })
        .await
    }

    /// Fetches and appends the next page
    ///
    /// Does nothing and returns the current state when the listing is not
    /// ready, when the last page has no next page, or when another call is
    /// already fetching. A failure keeps the pages already loaded and records
    /// the error.
    pub async fn fetch_more<T, F, Fut>(&self, key: QueryKey, mut fetcher: F) -> QueryState<InfinitePages<T>>
    where
        T: Send + Sync + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, TransportError>>,
    {
        let (generation, cursor) = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(&key) else {
                return QueryState::inactive();
            };
            let current = entry.snapshot();
            let state = QueryState::<InfinitePages<T>>::from_raw(&current);

            if state.status != QueryStatus::Ready || state.is_fetching_more {
                return state;
            }
            let Some(cursor) = state.data.as_ref().and_then(|pages| pages.next_cursor()) else {
                return state;
            };

            entry.tx.send_modify(|raw| {
                raw.fetching_more = true;
                raw.error = None;
            });
            (entry.generation, cursor)
        };

        debug!(key = %key, cursor, "fetching next page");
        let guard = RequestGuard::new(self, &key, generation);
        let outcome = self
            .attempt_with_retry(&key, generation, || fetcher(cursor))
            .await;
        guard.disarm();

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(&key) else {
            return QueryState::inactive();
        };
        if entry.generation != generation {
            debug!(key = %key, "discarding superseded page");
            return QueryState::from_raw(&entry.snapshot());
        }

        let previous = QueryState::<InfinitePages<T>>::from_raw(&entry.snapshot());
        entry.tx.send_modify(|raw| {
            match (outcome, previous.data) {
                (Ok(page), Some(pages)) => {
                    raw.data = Some(Arc::new(pages.appended(page)) as AnyData);
                    raw.updated_at = Some(chrono::Utc::now());
                }
                (Ok(_), None) => {}
                (Err(message), _) => raw.error = Some(message),
            }
            raw.fetching_more = false;
        });
        QueryState::from_raw(&entry.snapshot())
    }
}
