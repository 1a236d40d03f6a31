//! Query cache for API responses
//!
//! This module provides an in-memory store that caches fetched records per
//! composite key, applies a staleness, retry and eviction policy, and lets
//! consumers observe each entry's state transitions. The dataset is static, so
//! by default data never goes stale; unused entries are evicted after a day.

mod gc;
mod infinite;
mod key;
mod state;
mod store;
mod subscription;

pub use gc::GcHandle;
pub use infinite::InfinitePages;
pub use key::{QueryKey, QueryOp};
pub use state::{QueryState, QueryStatus};
pub use store::{QueryConfig, QueryStore, DEFAULT_GC_TIME, DEFAULT_RETRY, DEFAULT_RETRY_DELAY};
pub use subscription::Subscription;
