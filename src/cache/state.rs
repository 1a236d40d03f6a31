//! Observable state of a cache entry

use chrono::{DateTime, Utc};
use std::any::Any;
use std::sync::Arc;

/// Type-erased payload stored in the cache
pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

/// Lifecycle of a cache entry
///
/// `Inactive → Loading → {Ready, Failed}`; `Ready` and `Failed` go back to
/// `Loading` on refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No request has been issued (or the lookup is gated off)
    Inactive,
    /// A request is in flight
    Loading,
    /// Data is available
    Ready,
    /// The last request failed after all retries
    Failed,
}

/// Untyped entry state as published on the entry's watch channel
#[derive(Clone)]
pub(crate) struct RawState {
    pub status: QueryStatus,
    pub data: Option<AnyData>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fetching_more: bool,
}

impl RawState {
    pub fn inactive() -> Self {
        Self {
            status: QueryStatus::Inactive,
            data: None,
            error: None,
            updated_at: None,
            fetching_more: false,
        }
    }
}

/// Snapshot of a cache entry handed to consumers
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    /// Last successfully fetched data; kept while refetching or after a failure
    pub data: Option<Arc<T>>,
    /// Display message of the last failure
    pub error: Option<String>,
    /// When the data was last written
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether an incremental next-page fetch is in flight
    pub is_fetching_more: bool,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
            is_fetching_more: self.is_fetching_more,
        }
    }
}

impl<T> QueryState<T> {
    /// State of a lookup that never issued a request
    pub fn inactive() -> Self {
        Self {
            status: QueryStatus::Inactive,
            data: None,
            error: None,
            updated_at: None,
            is_fetching_more: false,
        }
    }

    pub fn is_inactive(&self) -> bool {
        self.status == QueryStatus::Inactive
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.status == QueryStatus::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.status == QueryStatus::Failed
    }
}

impl<T: Send + Sync + 'static> QueryState<T> {
    /// Builds a typed snapshot from the erased state
    ///
    /// Data of an unexpected type is reported as absent.
    pub(crate) fn from_raw(raw: &RawState) -> Self {
        Self {
            status: raw.status,
            data: raw.data.clone().and_then(|data| data.downcast::<T>().ok()),
            error: raw.error.clone(),
            updated_at: raw.updated_at,
            is_fetching_more: raw.fetching_more,
        }
    }
}
