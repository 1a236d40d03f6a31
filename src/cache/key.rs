//! Cache keys
//!
//! A key names one cache entry: which resource kind, which operation, and the
//! operation's parameters.

use std::fmt;

use crate::data::ResourceKind;

/// The operation a cache entry was produced by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryOp {
    /// A single record by numeric id
    ById(u32),
    /// One page of the plain listing; `None` is the first page
    Page(Option<u32>),
    /// Server-side search by a non-blank term
    Search(String),
    /// Accumulated pages of the incremental listing
    Infinite,
}

/// Composite key addressing one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub op: QueryOp,
}

impl QueryKey {
    pub fn by_id(kind: ResourceKind, id: u32) -> Self {
        Self {
            kind,
            op: QueryOp::ById(id),
        }
    }

    pub fn page(kind: ResourceKind, page: Option<u32>) -> Self {
        Self {
            kind,
            op: QueryOp::Page(page),
        }
    }

    /// Key for a search, or `None` when the term is blank
    pub fn search(kind: ResourceKind, term: &str) -> Option<Self> {
        let term = term.trim();
        if term.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            op: QueryOp::Search(term.to_string()),
        })
    }

    pub fn infinite(kind: ResourceKind) -> Self {
        Self {
            kind,
            op: QueryOp::Infinite,
        }
    }

    /// Key for a listing that is searched when a term is present
    ///
    /// A blank term falls back to the first page of the plain listing, so
    /// callers can switch between the two without a separate code path.
    pub fn listing(kind: ResourceKind, term: &str) -> Self {
        Self::search(kind, term).unwrap_or_else(|| Self::page(kind, None))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            QueryOp::ById(id) => write!(f, "{}/by-id/{}", self.kind, id),
            QueryOp::Page(Some(page)) => write!(f, "{}/page/{}", self.kind, page),
            QueryOp::Page(None) => write!(f, "{}/page/first", self.kind),
            QueryOp::Search(term) => write!(f, "{}/search/{}", self.kind, term),
            QueryOp::Infinite => write!(f, "{}/infinite", self.kind),
        }
    }
}
