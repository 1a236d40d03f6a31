//! In-process mock of the Star Wars API for integration tests.
//!
//! Serves a small fixed dataset under `/api`, counts requests per URI, and
//! can be told to fail or stall the next requests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use swapi_explorer::api::SwapiClient;
use swapi_explorer::cache::{QueryConfig, QueryStore};
use swapi_explorer::config::Config;
use swapi_explorer::explorer::Explorer;

/// Number of people per listing page
pub const PAGE_SIZE: usize = 2;

const PEOPLE: [(&str, u32, &[u32]); 5] = [
    ("Luke Skywalker", 1, &[1, 2]),
    ("C-3PO", 1, &[1]),
    ("R2-D2", 2, &[1, 2]),
    ("Darth Vader", 1, &[2]),
    ("Leia Organa", 42, &[1, 3]),
];

const FILMS: [(&str, u32); 2] = [("A New Hope", 4), ("The Empire Strikes Back", 5)];

const PLANETS: [(&str, &str); 2] = [("Tatooine", "arid"), ("Alderaan", "temperate")];

pub struct MockState {
    base: String,
    hits: Mutex<HashMap<String, usize>>,
    fail_next: AtomicUsize,
    delay_ms: AtomicU64,
    opaque_cursor: AtomicBool,
}

/// Handle to a running mock server
#[derive(Clone)]
pub struct MockSwapi {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockSwapi {
    /// Requests served for an exact path and query, e.g. `/api/people/?page=2`
    pub fn hits(&self, path_and_query: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(path_and_query)
            .copied()
            .unwrap_or(0)
    }

    /// Total requests served
    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().values().sum()
    }

    /// Makes the next `n` requests fail with an empty-bodied 500
    pub fn fail_next(&self, n: usize) {
        self.state.fail_next.store(n, Ordering::SeqCst);
    }

    /// Delays every response by `delay`
    pub fn set_delay(&self, delay: Duration) {
        self.state
            .delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Makes people listings link to the next page without a `page` param
    pub fn use_opaque_cursor(&self) {
        self.state.opaque_cursor.store(true, Ordering::SeqCst);
    }

    pub fn config(&self) -> Config {
        Config::new(&self.base_url).expect("mock base URL is valid")
    }

    /// Configuration whose endpoints answer 200 with a body that is not JSON
    pub fn malformed_config(&self) -> Config {
        let root = self.base_url.trim_end_matches("/api");
        Config::new(&format!("{}/malformed", root)).expect("mock base URL is valid")
    }

    /// Explorer with no pause between retries
    pub fn explorer(&self) -> Explorer {
        let config = self.config();
        let client = SwapiClient::new(&config).expect("client builds");
        let store = QueryStore::new(QueryConfig {
            retry_delay: Duration::ZERO,
            ..QueryConfig::default()
        });
        Explorer::new(client, store)
    }
}

/// Starts the mock server on a random local port
pub async fn start() -> MockSwapi {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/api", addr);

    let state = Arc::new(MockState {
        base: base_url.clone(),
        hits: Mutex::new(HashMap::new()),
        fail_next: AtomicUsize::new(0),
        delay_ms: AtomicU64::new(0),
        opaque_cursor: AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/api/people/", get(list_people))
        .route("/api/people/{id}/", get(get_person))
        .route("/api/films/", get(list_films))
        .route("/api/films/{id}/", get(get_film))
        .route("/api/planets/", get(list_planets))
        .route("/api/planets/{id}/", get(get_planet))
        .route("/malformed/{*rest}", get(malformed))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockSwapi { base_url, state }
}

#[derive(Deserialize)]
struct ListParams {
    page: Option<usize>,
    search: Option<String>,
}

/// Records the hit, then applies configured delay and failure
async fn gate(state: &MockState, uri: &Uri) -> Option<Response> {
    let key = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    {
        let mut hits = state.hits.lock().unwrap();
        *hits.entry(key).or_insert(0) += 1;
    }

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let failing = state
        .fail_next
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return Some(StatusCode::INTERNAL_SERVER_ERROR.into_response());
    }
    None
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found" }))).into_response()
}

fn person(base: &str, index: usize) -> Value {
    let (name, homeworld, films) = PEOPLE[index];
    json!({
        "name": name,
        "height": "172",
        "mass": "77",
        "hair_color": "blond",
        "skin_color": "fair",
        "eye_color": "blue",
        "birth_year": "19BBY",
        "gender": "male",
        "homeworld": format!("{}/planets/{}/", base, homeworld),
        "films": films.iter().map(|f| format!("{}/films/{}/", base, f)).collect::<Vec<_>>(),
        "species": [],
        "vehicles": [],
        "starships": [],
        "created": "2014-12-09T13:50:51.644000Z",
        "edited": "2014-12-20T21:17:56.891000Z",
        "url": format!("{}/people/{}/", base, index + 1),
    })
}

fn film(base: &str, index: usize) -> Value {
    let (title, episode) = FILMS[index];
    json!({
        "title": title,
        "episode_id": episode,
        "opening_crawl": "It is a period of civil war.\r\nRebel spaceships...",
        "director": "George Lucas",
        "producer": "Gary Kurtz",
        "release_date": "1977-05-25",
        "characters": [format!("{}/people/1/", base)],
        "planets": [format!("{}/planets/1/", base)],
        "starships": [],
        "vehicles": [],
        "species": [],
        "created": "2014-12-10T14:23:31.880000Z",
        "edited": "2014-12-20T19:49:45.256000Z",
        "url": format!("{}/films/{}/", base, index + 1),
    })
}

fn planet(base: &str, index: usize) -> Value {
    let (name, climate) = PLANETS[index];
    json!({
        "name": name,
        "rotation_period": "23",
        "orbital_period": "304",
        "diameter": "10465",
        "climate": climate,
        "gravity": "1 standard",
        "terrain": "desert",
        "surface_water": "1",
        "population": "200000",
        "residents": [format!("{}/people/1/", base)],
        "films": [format!("{}/films/1/", base), format!("{}/films/7/", base)],
        "created": "2014-12-09T13:50:49.641000Z",
        "edited": "2014-12-20T20:58:18.411000Z",
        "url": format!("{}/planets/{}/", base, index + 1),
    })
}

fn envelope(count: usize, next: Option<String>, previous: Option<String>, results: Vec<Value>) -> Response {
    Json(json!({
        "count": count,
        "next": next,
        "previous": previous,
        "results": results,
    }))
    .into_response()
}

async fn list_people(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }

    if let Some(term) = params.search {
        let term = term.to_lowercase();
        let results: Vec<Value> = (0..PEOPLE.len())
            .filter(|&i| PEOPLE[i].0.to_lowercase().contains(&term))
            .map(|i| person(&state.base, i))
            .collect();
        return envelope(results.len(), None, None, results);
    }

    let page = params.page.unwrap_or(1);
    if page == 0 || (page - 1) * PAGE_SIZE >= PEOPLE.len() {
        return not_found();
    }
    let start = (page - 1) * PAGE_SIZE;
    let end = (start + PAGE_SIZE).min(PEOPLE.len());
    let results = (start..end).map(|i| person(&state.base, i)).collect();
    let next = (end < PEOPLE.len()).then(|| {
        if state.opaque_cursor.load(Ordering::SeqCst) {
            format!("{}/people/?cursor=abc", state.base)
        } else {
            format!("{}/people/?page={}", state.base, page + 1)
        }
    });
    let previous = (page > 1).then(|| format!("{}/people/?page={}", state.base, page - 1));
    envelope(PEOPLE.len(), next, previous, results)
}

async fn get_person(State(state): State<Arc<MockState>>, uri: Uri, Path(id): Path<usize>) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    if id == 0 || id > PEOPLE.len() {
        return not_found();
    }
    Json(person(&state.base, id - 1)).into_response()
}

async fn list_films(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    let term = params.search.unwrap_or_default().to_lowercase();
    let results: Vec<Value> = (0..FILMS.len())
        .filter(|&i| FILMS[i].0.to_lowercase().contains(&term))
        .map(|i| film(&state.base, i))
        .collect();
    envelope(results.len(), None, None, results)
}

async fn get_film(State(state): State<Arc<MockState>>, uri: Uri, Path(id): Path<usize>) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    if id == 0 || id > FILMS.len() {
        return not_found();
    }
    Json(film(&state.base, id - 1)).into_response()
}

async fn list_planets(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    let term = params.search.unwrap_or_default().to_lowercase();
    let results: Vec<Value> = (0..PLANETS.len())
        .filter(|&i| PLANETS[i].0.to_lowercase().contains(&term))
        .map(|i| planet(&state.base, i))
        .collect();
    envelope(results.len(), None, None, results)
}

async fn get_planet(State(state): State<Arc<MockState>>, uri: Uri, Path(id): Path<usize>) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    if id == 0 || id > PLANETS.len() {
        return not_found();
    }
    Json(planet(&state.base, id - 1)).into_response()
}

async fn malformed(State(state): State<Arc<MockState>>, uri: Uri) -> Response {
    if let Some(resp) = gate(&state, &uri).await {
        return resp;
    }
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}
