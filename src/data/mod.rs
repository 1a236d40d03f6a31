//! Core data models for the SWAPI explorer
//!
//! This module contains the records returned by the Star Wars API. They are
//! decoded straight from JSON and never constructed or mutated locally, except
//! in tests.

pub mod url;

pub use url::{extract_id, next_page_cursor, parse_id, UrlError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three resource categories exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    People,
    Films,
    Planets,
}

impl ResourceKind {
    /// Path segment used by the API for this kind (e.g. `people`)
    pub fn path_segment(self) -> &'static str {
        match self {
            ResourceKind::People => "people",
            ResourceKind::Films => "films",
            ResourceKind::Planets => "planets",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// A record type that can be fetched from the API
///
/// Ties each model to its [`ResourceKind`] so accessors and cache keys can be
/// written once for all kinds.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Which endpoint family this record comes from
    const KIND: ResourceKind;

    /// The record's self URL
    fn url(&self) -> &str;

    /// Human-readable label (name or title)
    fn label(&self) -> &str;
}

/// A Star Wars character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    /// Height in centimetres, as sent by the API (may be "unknown")
    pub height: String,
    /// Mass in kilograms, as sent by the API (may contain separators)
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    /// URL of the home planet
    pub homeworld: String,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    pub created: DateTime<Utc>,
    pub edited: DateTime<Utc>,
    pub url: String,
}

/// A Star Wars film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub episode_id: u32,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub planets: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    pub created: DateTime<Utc>,
    pub edited: DateTime<Utc>,
    pub url: String,
}

/// A Star Wars planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    pub surface_water: String,
    pub population: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    pub created: DateTime<Utc>,
    pub edited: DateTime<Utc>,
    pub url: String,
}

impl Resource for Person {
    const KIND: ResourceKind = ResourceKind::People;

    fn url(&self) -> &str {
        &self.url
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl Resource for Film {
    const KIND: ResourceKind = ResourceKind::Films;

    fn url(&self) -> &str {
        &self.url
    }

    fn label(&self) -> &str {
        &self.title
    }
}

impl Resource for Planet {
    const KIND: ResourceKind = ResourceKind::Planets;

    fn url(&self) -> &str {
        &self.url
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Paginated list envelope returned by list and search endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of records across all pages
    pub count: u32,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
    /// Records on this page, in server order
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Whether the service reports another page after this one
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether this page holds no records
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T: Resource> Page<T> {
    /// Finds a record on this page by its self URL
    ///
    /// A reference that is not on the page resolves to `None`; dangling
    /// references are absence, not failure.
    pub fn find_by_url(&self, url: &str) -> Option<&T> {
        self.results.iter().find(|record| record.url() == url)
    }
}

/// Error body the API may send with a non-2xx response
///
/// Any combination of fields may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
    pub status: Option<u16>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LUKE: &str = r#"{
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "homeworld": "https://swapi.dev/api/planets/1/",
        "films": ["https://swapi.dev/api/films/1/", "https://swapi.dev/api/films/2/"],
        "species": [],
        "vehicles": ["https://swapi.dev/api/vehicles/14/"],
        "starships": ["https://swapi.dev/api/starships/12/"],
        "created": "2014-12-09T13:50:51.644000Z",
        "edited": "2014-12-20T21:17:56.891000Z",
        "url": "https://swapi.dev/api/people/1/"
    }"#;

    const TATOOINE: &str = r#"{
        "name": "Tatooine",
        "rotation_period": "23",
        "orbital_period": "304",
        "diameter": "10465",
        "climate": "arid",
        "gravity": "1 standard",
        "terrain": "desert",
        "surface_water": "1",
        "population": "200000",
        "residents": ["https://swapi.dev/api/people/1/"],
        "films": ["https://swapi.dev/api/films/1/"],
        "created": "2014-12-09T13:50:49.641000Z",
        "edited": "2014-12-20T20:58:18.411000Z",
        "url": "https://swapi.dev/api/planets/1/"
    }"#;

    #[test]
    fn test_person_deserializes_from_api_json() {
        let person: Person = serde_json::from_str(LUKE).expect("Failed to parse person");

        assert_eq!(person.name, "Luke Skywalker");
        assert_eq!(person.height, "172");
        assert_eq!(person.homeworld, "https://swapi.dev/api/planets/1/");
        assert_eq!(person.films.len(), 2);
        assert!(person.species.is_empty());
        assert_eq!(person.label(), "Luke Skywalker");
        assert_eq!(Person::KIND, ResourceKind::People);
    }

    #[test]
    fn test_film_deserializes_with_missing_reference_lists() {
        let json = r#"{
            "title": "A New Hope",
            "episode_id": 4,
            "opening_crawl": "It is a period of civil war.",
            "director": "George Lucas",
            "producer": "Gary Kurtz, Rick McCallum",
            "release_date": "1977-05-25",
            "created": "2014-12-10T14:23:31.880000Z",
            "edited": "2014-12-20T19:49:45.256000Z",
            "url": "https://swapi.dev/api/films/1/"
        }"#;

        let film: Film = serde_json::from_str(json).expect("Failed to parse film");

        assert_eq!(film.episode_id, 4);
        assert!(film.characters.is_empty());
        assert_eq!(film.label(), "A New Hope");
    }

    #[test]
    fn test_page_envelope_deserializes() {
        let json = format!(
            r#"{{"count": 60, "next": "https://swapi.dev/api/planets/?page=2", "previous": null, "results": [{}]}}"#,
            TATOOINE
        );

        let page: Page<Planet> = serde_json::from_str(&json).expect("Failed to parse page");

        assert_eq!(page.count, 60);
        assert!(page.has_next());
        assert!(page.previous.is_none());
        assert_eq!(page.results[0].climate, "arid");
    }

    #[test]
    fn test_find_by_url_returns_none_for_dangling_reference() {
        let planet: Planet = serde_json::from_str(TATOOINE).unwrap();
        let page = Page {
            count: 1,
            next: None,
            previous: None,
            results: vec![planet],
        };

        assert!(page.find_by_url("https://swapi.dev/api/planets/1/").is_some());
        assert!(page.find_by_url("https://swapi.dev/api/planets/99/").is_none());
    }

    #[test]
    fn test_error_body_fields_are_optional() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"detail": "Not found"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("Not found"));
        assert!(body.status.is_none());
        assert!(body.message.is_none());

        let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ApiErrorBody::default());
    }

    #[test]
    fn test_resource_kind_path_segments() {
        assert_eq!(ResourceKind::People.path_segment(), "people");
        assert_eq!(ResourceKind::Films.to_string(), "films");
        assert_eq!(ResourceKind::Planets.path_segment(), "planets");
    }
}
