//! Command execution for the SWAPI explorer
//!
//! Runs one parsed [`Command`] against an [`Explorer`] and returns the text to
//! print. Failures come back as the normalized user-facing message.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::UNEXPECTED_MESSAGE;
use crate::cache::QueryState;
use crate::cli::{CliError, Command};
use crate::data::{parse_id, Film, Page};
use crate::explorer::Explorer;
use crate::render;

/// Errors reported to the user by the binary
#[derive(Debug, Error)]
pub enum AppError {
    /// A lookup failed; carries the display message
    #[error("{0}")]
    Query(String),

    /// The command line was invalid
    #[error(transparent)]
    Cli(#[from] CliError),
}

/// Executes a command and returns the rendered output
pub async fn run(explorer: &Explorer, command: &Command) -> Result<String, AppError> {
    command.validate()?;

    match command {
        Command::People { all: true, .. } => all_people(explorer).await,
        Command::People { search: Some(term), .. } => {
            let page = ready(explorer.people_listing(term).await)?;
            Ok(render::page(&*page, render::person_card))
        }
        Command::People { page, .. } => {
            let page = ready(explorer.people(*page).await)?;
            Ok(render::page(&*page, render::person_card))
        }
        Command::Person { id } => person_detail(explorer, *id).await,
        Command::Films { search } => {
            let page = ready(explorer.films_listing(search.as_deref().unwrap_or("")).await)?;
            Ok(render::page(&*page, render::film_card))
        }
        Command::Film { id } => film_detail(explorer, *id).await,
        Command::Planets { search: Some(term), .. } => {
            let page = ready(explorer.planets_listing(term).await)?;
            Ok(render::page(&*page, render::planet_card))
        }
        Command::Planets { page, .. } => {
            let page = ready(explorer.planets(*page).await)?;
            Ok(render::page(&*page, render::planet_card))
        }
        Command::Planet { id } => planet_detail(explorer, *id).await,
    }
}

/// Walks the incremental people listing until the last page
async fn all_people(explorer: &Explorer) -> Result<String, AppError> {
    let mut state = explorer.people_infinite().await;
    while state.is_ready() && state.error.is_none() {
        let Some(loaded) = state.data.as_ref() else {
            break;
        };
        if loaded.next_cursor().is_none() {
            if loaded.has_more() {
                warn!("next page link carries no page number; stopping");
            }
            break;
        }

        let before = loaded.page_count();
        state = explorer.people_fetch_more().await;
        if state.data.as_ref().map_or(0, |pages| pages.page_count()) <= before {
            break;
        }
    }
    if let Some(message) = state.error.clone() {
        return Err(AppError::Query(message));
    }

    let pages = ready(state)?;
    let people: Vec<_> = pages.items().cloned().collect();
    let total = pages.pages().first().map_or(0, |page| page.count);
    debug!(pages = pages.page_count(), records = people.len(), "loaded all people");
    Ok(render::listing(&people, total, render::person_card))
}

async fn person_detail(explorer: &Explorer, id: u32) -> Result<String, AppError> {
    let person = ready(explorer.person(Some(id)).await)?;

    let (homeworld, films) = futures::join!(
        explorer.planet(parse_id(&person.homeworld).ok()),
        explorer.films(None)
    );
    let films = films.data;
    let resolved = resolve_films(films.as_deref(), &person.films);

    Ok(render::person_detail(&person, homeworld.data.as_deref(), &resolved))
}

/// Film with each planet looked up by id; dangling references come back empty
async fn film_detail(explorer: &Explorer, id: u32) -> Result<String, AppError> {
    let film = ready(explorer.film(Some(id)).await)?;
    let lookups = film
        .planets
        .iter()
        .map(|url| explorer.planet(parse_id(url).ok()));
    let planets = futures::future::join_all(lookups).await;
    let resolved: Vec<_> = planets.iter().map(|state| state.data.as_deref()).collect();
    Ok(render::film_detail(&film, &resolved))
}

async fn planet_detail(explorer: &Explorer, id: u32) -> Result<String, AppError> {
    let planet = ready(explorer.planet(Some(id)).await)?;
    let films = explorer.films(None).await.data;
    let resolved = resolve_films(films.as_deref(), &planet.films);
    Ok(render::planet_detail(&planet, &resolved))
}

/// Matches film references against the film listing; unknown ones are `None`
fn resolve_films<'a>(listing: Option<&'a Page<Film>>, references: &[String]) -> Vec<Option<&'a Film>> {
    references
        .iter()
        .map(|url| listing.and_then(|page| page.find_by_url(url)))
        .collect()
}

/// Extracts the data of a settled lookup or its error message
fn ready<T>(state: QueryState<T>) -> Result<Arc<T>, AppError> {
    if state.is_failed() {
        let message = state.error.unwrap_or_else(|| UNEXPECTED_MESSAGE.to_string());
        return Err(AppError::Query(message));
    }
    state
        .data
        .ok_or_else(|| AppError::Query(UNEXPECTED_MESSAGE.to_string()))
}
