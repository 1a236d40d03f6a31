//! Resource URL helpers
//!
//! The API identifies records by URL (`.../people/5/`) and paginates with a
//! `next` URL carrying a `page=<n>` query parameter. Both conventions are
//! parsed here and nowhere else.

use thiserror::Error;

/// Errors produced when a resource URL does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    /// The URL does not end in `/<digits>/`
    #[error("Invalid SWAPI URL format: {0}")]
    InvalidResourceUrl(String),

    /// The identifier is zero or does not fit in a `u32`
    #[error("Invalid resource id '{0}'")]
    InvalidId(String),
}

/// Extracts the trailing numeric identifier from a resource URL
///
/// Returns the digit run between the last two slashes of a URL that ends in
/// `/<digits>/`. No host or path validation is done.
///
/// # Examples
/// ```
/// use swapi_explorer::data::extract_id;
///
/// assert_eq!(extract_id("https://swapi.dev/api/people/5/").unwrap(), "5");
/// assert!(extract_id("https://swapi.dev/api/people/x/").is_err());
/// ```
pub fn extract_id(url: &str) -> Result<&str, UrlError> {
    let invalid = || UrlError::InvalidResourceUrl(url.to_string());

    let body = url.strip_suffix('/').ok_or_else(invalid)?;
    let prefix = body.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &body[prefix.len()..];

    if digits.is_empty() || !prefix.ends_with('/') {
        return Err(invalid());
    }

    Ok(digits)
}

/// Extracts the identifier from a resource URL as a positive number
pub fn parse_id(url: &str) -> Result<u32, UrlError> {
    let digits = extract_id(url)?;
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(UrlError::InvalidId(digits.to_string())),
        Ok(id) => Ok(id),
    }
}

/// Derives the next page number from a page envelope's `next` URL
///
/// Looks for a `page=<digits>` query parameter. Returns `None` when there is
/// no next URL or it does not carry a page number, which ends pagination.
pub fn next_page_cursor(next: Option<&str>) -> Option<u32> {
    let next = next?;
    let (_, query) = next.split_once('?')?;

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())
}
