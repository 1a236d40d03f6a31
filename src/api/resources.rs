//! Typed accessors for people, films and planets
//!
//! Each kind gets fetch-by-id, fetch-page and search. None of them retry;
//! retry policy belongs to the query cache.

use super::client::SwapiClient;
use super::error::TransportError;
use crate::data::{Film, Page, Person, Planet, Resource};

impl SwapiClient {
    /// Fetches a single record by its numeric id (`/<kind>/<id>/`)
    pub async fn fetch_one<R: Resource>(&self, id: u32) -> Result<R, TransportError> {
        let url = self.endpoint(&format!("{}/{}/", R::KIND.path_segment(), id))?;
        self.get_json(url).await
    }

    /// Fetches one page of a listing (`/<kind>/?page=<n>`)
    ///
    /// `None` requests the first page without a query string.
    pub async fn fetch_page<R: Resource>(&self, page: Option<u32>) -> Result<Page<R>, TransportError> {
        let mut url = self.endpoint(&format!("{}/", R::KIND.path_segment()))?;
        if let Some(page) = page {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        self.get_json(url).await
    }

    /// Searches a listing by term (`/<kind>/?search=<term>`)
    ///
    /// The term is sent as given; callers are expected to skip blank terms.
    pub async fn search<R: Resource>(&self, term: &str) -> Result<Page<R>, TransportError> {
        let mut url = self.endpoint(&format!("{}/", R::KIND.path_segment()))?;
        url.query_pairs_mut().append_pair("search", term);
        self.get_json(url).await
    }

    /// Fetches a single character
    pub async fn fetch_person(&self, id: u32) -> Result<Person, TransportError> {
        self.fetch_one(id).await
    }

    /// Fetches a page of characters
    pub async fn fetch_people(&self, page: Option<u32>) -> Result<Page<Person>, TransportError> {
        self.fetch_page(page).await
    }

    /// Searches characters by name
    pub async fn search_people(&self, name: &str) -> Result<Page<Person>, TransportError> {
        self.search(name).await
    }

    /// Fetches a single film
    pub async fn fetch_film(&self, id: u32) -> Result<Film, TransportError> {
        self.fetch_one(id).await
    }

    /// Fetches a page of films
    pub async fn fetch_films(&self, page: Option<u32>) -> Result<Page<Film>, TransportError> {
        self.fetch_page(page).await
    }

    /// Searches films by title
    pub async fn search_films(&self, title: &str) -> Result<Page<Film>, TransportError> {
        self.search(title).await
    }

    /// Fetches a single planet
    pub async fn fetch_planet(&self, id: u32) -> Result<Planet, TransportError> {
        self.fetch_one(id).await
    }

    /// Fetches a page of planets
    pub async fn fetch_planets(&self, page: Option<u32>) -> Result<Page<Planet>, TransportError> {
        self.fetch_page(page).await
    }

    /// Searches planets by name
    pub async fn search_planets(&self, name: &str) -> Result<Page<Planet>, TransportError> {
        self.search(name).await
    }
}
