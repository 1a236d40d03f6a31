//! Typed lookups over the API and the query cache
//!
//! `Explorer` is what a presentation layer talks to: each method builds the
//! cache key for a lookup, gates it when its input is absent, and runs the
//! matching accessor through the [`QueryStore`].

use crate::api::{SwapiClient, TransportError};
use crate::cache::{InfinitePages, QueryKey, QueryState, QueryStore, Subscription};
use crate::config::Config;
use crate::data::{Film, Page, Person, Planet, Resource, ResourceKind};

/// Cached access to people, films and planets
#[derive(Clone)]
pub struct Explorer {
    client: SwapiClient,
    store: QueryStore,
}

impl Explorer {
    /// Creates an explorer from existing parts
    pub fn new(client: SwapiClient, store: QueryStore) -> Self {
        Self { client, store }
    }

    /// Creates an explorer with a fresh store from the runtime configuration
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let client = SwapiClient::new(config)?;
        Ok(Self::new(client, QueryStore::new(config.query.clone())))
    }

    pub fn client(&self) -> &SwapiClient {
        &self.client
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    /// Looks up one record; an absent id is inactive and issues no request
    pub async fn record<R: Resource>(&self, id: Option<u32>) -> QueryState<R> {
        let Some(id) = id else {
            return QueryState::inactive();
        };
        self.store
            .fetch(QueryKey::by_id(R::KIND, id), || self.client.fetch_one::<R>(id))
            .await
    }

    /// Fetches one record again, replacing the cached copy
    pub async fn refetch_record<R: Resource>(&self, id: Option<u32>) -> QueryState<R> {
        let Some(id) = id else {
            return QueryState::inactive();
        };
        self.store
            .refetch(QueryKey::by_id(R::KIND, id), || self.client.fetch_one::<R>(id))
            .await
    }

    /// Looks up one page of a plain listing
    pub async fn page<R: Resource>(&self, page: Option<u32>) -> QueryState<Page<R>> {
        self.store
            .fetch(QueryKey::page(R::KIND, page), || self.client.fetch_page::<R>(page))
            .await
    }

    /// Searches a listing; a blank term is inactive and issues no request
    pub async fn search<R: Resource>(&self, term: &str) -> QueryState<Page<R>> {
        let Some(key) = QueryKey::search(R::KIND, term) else {
            return QueryState::inactive();
        };
        let term = term.trim();
        self.store
            .fetch(key, || self.client.search::<R>(term))
            .await
    }

    /// Search results when the term is non-blank, otherwise the first page
    pub async fn listing<R: Resource>(&self, term: &str) -> QueryState<Page<R>> {
        if term.trim().is_empty() {
            self.page(None).await
        } else {
            self.search(term).await
        }
    }

    /// Fetches the current listing again
    pub async fn refetch_listing<R: Resource>(&self, term: &str) -> QueryState<Page<R>> {
        let key = QueryKey::listing(R::KIND, term);
        let term = term.trim();
        if term.is_empty() {
            self.store
                .refetch(key, || self.client.fetch_page::<R>(None))
                .await
        } else {
            self.store.refetch(key, || self.client.search::<R>(term)).await
        }
    }

    /// Observes a record lookup
    pub fn subscribe_record<R: Resource>(&self, id: u32) -> Subscription<R> {
        self.store.subscribe(QueryKey::by_id(R::KIND, id))
    }

    /// Drops interest in an in-flight record lookup
    pub fn cancel_record(&self, kind: ResourceKind, id: u32) {
        self.store.cancel(&QueryKey::by_id(kind, id));
    }

    pub async fn person(&self, id: Option<u32>) -> QueryState<Person> {
        self.record(id).await
    }

    pub async fn film(&self, id: Option<u32>) -> QueryState<Film> {
        self.record(id).await
    }

    pub async fn planet(&self, id: Option<u32>) -> QueryState<Planet> {
        self.record(id).await
    }

    pub async fn people(&self, page: Option<u32>) -> QueryState<Page<Person>> {
        self.page(page).await
    }

    pub async fn films(&self, page: Option<u32>) -> QueryState<Page<Film>> {
        self.page(page).await
    }

    pub async fn planets(&self, page: Option<u32>) -> QueryState<Page<Planet>> {
        self.page(page).await
    }

    pub async fn people_search(&self, name: &str) -> QueryState<Page<Person>> {
        self.search(name).await
    }

    pub async fn films_search(&self, title: &str) -> QueryState<Page<Film>> {
        self.search(title).await
    }

    pub async fn planets_search(&self, name: &str) -> QueryState<Page<Planet>> {
        self.search(name).await
    }

    /// Character search, or the first page when `name` is blank
    pub async fn people_listing(&self, name: &str) -> QueryState<Page<Person>> {
        self.listing(name).await
    }

    pub async fn films_listing(&self, title: &str) -> QueryState<Page<Film>> {
        self.listing(title).await
    }

    pub async fn planets_listing(&self, name: &str) -> QueryState<Page<Planet>> {
        self.listing(name).await
    }

    /// First page of the incremental people listing
    pub async fn people_infinite(&self) -> QueryState<InfinitePages<Person>> {
        self.store
            .fetch_infinite(QueryKey::infinite(ResourceKind::People), |page| {
                self.client.fetch_people(page)
            })
            .await
    }

    /// Appends the next page of the incremental people listing
    ///
    /// Ignored while another next-page fetch is in flight or after the last page.
    pub async fn people_fetch_more(&self) -> QueryState<InfinitePages<Person>> {
        self.store
            .fetch_more(QueryKey::infinite(ResourceKind::People), |page| {
                self.client.fetch_people(Some(page))
            })
            .await
    }

    /// Reloads the incremental people listing from its first page
    pub async fn people_refetch_infinite(&self) -> QueryState<InfinitePages<Person>> {
        self.store
            .refetch_infinite(QueryKey::infinite(ResourceKind::People), |page| {
                self.client.fetch_people(page)
            })
            .await
    }
}
