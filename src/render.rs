//! Plain-text cards and detail views
//!
//! Everything here is presentation: functions take records and return the
//! text printed by the binary.

use std::fmt::Write;

use crate::data::{extract_id, Film, Page, Person, Planet, Resource};

/// Shown when a listing or search has no results
pub const EMPTY_MESSAGE: &str = "No records found";

/// Shown for a reference that could not be resolved
pub const UNKNOWN: &str = "unknown";

/// Id shown on a card, or `?` if the record's URL is malformed
fn card_id<R: Resource>(record: &R) -> &str {
    extract_id(record.url()).unwrap_or("?")
}

pub fn person_card(person: &Person) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [#{}]", person.name, card_id(person));
    let _ = writeln!(out, "  Birth Year: {}", person.birth_year);
    let _ = writeln!(out, "  Gender:     {}", person.gender);
    let _ = writeln!(out, "  Height:     {} cm", person.height);
    let _ = writeln!(out, "  Mass:       {} kg", person.mass);
    out
}

pub fn film_card(film: &Film) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [#{}]", film.title, card_id(film));
    let _ = writeln!(out, "  Episode {}", film.episode_id);
    let _ = writeln!(out, "  Director:   {}", film.director);
    let _ = writeln!(out, "  Release:    {}", film.release_date);
    let _ = writeln!(out, "  Characters: {}", film.characters.len());
    out
}

pub fn planet_card(planet: &Planet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [#{}]", planet.name, card_id(planet));
    let _ = writeln!(out, "  Climate:    {}", planet.climate);
    let _ = writeln!(out, "  Terrain:    {}", planet.terrain);
    let _ = writeln!(out, "  Population: {}", planet.population);
    out
}

/// Renders every record of a listing with `card`, or the empty message
pub fn listing<T, F>(records: &[T], total: u32, card: F) -> String
where
    F: Fn(&T) -> String,
{
    if records.is_empty() {
        return format!("{}\n", EMPTY_MESSAGE);
    }

    let mut out = String::new();
    for record in records {
        out.push_str(&card(record));
        out.push('\n');
    }
    let _ = writeln!(out, "Showing {} of {}", records.len(), total);
    out
}

/// Renders one page envelope with `card`
pub fn page<T, F>(page: &Page<T>, card: F) -> String
where
    F: Fn(&T) -> String,
{
    listing(&page.results, page.count, card)
}

/// Full view of a character
///
/// `homeworld` and `films` are the resolved references; missing ones are
/// shown as unknown.
pub fn person_detail(person: &Person, homeworld: Option<&Planet>, films: &[Option<&Film>]) -> String {
    let mut out = person_card(person);
    let _ = writeln!(out, "  Hair:       {}", person.hair_color);
    let _ = writeln!(out, "  Skin:       {}", person.skin_color);
    let _ = writeln!(out, "  Eyes:       {}", person.eye_color);
    let _ = writeln!(
        out,
        "  Homeworld:  {}",
        homeworld.map_or(UNKNOWN, |planet| planet.name.as_str())
    );
    if !films.is_empty() {
        let _ = writeln!(out, "  Films:");
        for film in films {
            let _ = writeln!(out, "    - {}", film.map_or(UNKNOWN, |f| f.title.as_str()));
        }
    }
    let _ = writeln!(
        out,
        "  Species: {}  Vehicles: {}  Starships: {}",
        person.species.len(),
        person.vehicles.len(),
        person.starships.len()
    );
    out
}

/// Full view of a film with its resolved planets and the opening crawl
pub fn film_detail(film: &Film, planets: &[Option<&Planet>]) -> String {
    let mut out = film_card(film);
    let _ = writeln!(out, "  Producer:   {}", film.producer);
    if !planets.is_empty() {
        let _ = writeln!(out, "  Planets:");
        for planet in planets {
            let _ = writeln!(out, "    - {}", planet.map_or(UNKNOWN, |p| p.name.as_str()));
        }
    }
    let _ = writeln!(
        out,
        "  Starships: {}  Vehicles: {}  Species: {}",
        film.starships.len(),
        film.vehicles.len(),
        film.species.len()
    );
    out.push('\n');
    for line in film.opening_crawl.lines() {
        let _ = writeln!(out, "  {}", line.trim_end());
    }
    out
}

/// Full view of a planet with its resolved films
pub fn planet_detail(planet: &Planet, films: &[Option<&Film>]) -> String {
    let mut out = planet_card(planet);
    let _ = writeln!(out, "  Diameter:   {}", planet.diameter);
    let _ = writeln!(out, "  Gravity:    {}", planet.gravity);
    let _ = writeln!(out, "  Rotation:   {}", planet.rotation_period);
    let _ = writeln!(out, "  Orbit:      {}", planet.orbital_period);
    let _ = writeln!(out, "  Water:      {}", planet.surface_water);
    let _ = writeln!(out, "  Residents:  {}", planet.residents.len());
    if !films.is_empty() {
        let _ = writeln!(out, "  Films:");
        for film in films {
            let _ = writeln!(out, "    - {}", film.map_or(UNKNOWN, |f| f.title.as_str()));
        }
    }
    out
}
