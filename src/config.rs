//! Runtime configuration
//!
//! The API base URL must come from the environment; there is no built-in
//! default endpoint. Timeout and retry count have defaults and may be
//! overridden.

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

use crate::cache::QueryConfig;

/// Environment variable holding the API base URL
pub const BASE_URL_VAR: &str = "SWAPI_BASE_URL";

/// Environment variable overriding the request timeout in seconds
pub const TIMEOUT_VAR: &str = "SWAPI_TIMEOUT_SECS";

/// Environment variable overriding the number of retries after a failure
pub const RETRY_VAR: &str = "SWAPI_RETRY";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that prevent the explorer from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base URL variable is unset or blank
    #[error("SWAPI_BASE_URL environment variable is not set")]
    MissingBaseUrl,

    /// The base URL could not be parsed
    #[error("Invalid SWAPI_BASE_URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    /// A numeric setting could not be parsed
    #[error("Invalid value '{value}' for {var}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Settings for the transport and the query cache
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the API, always ending in a slash
    pub base_url: Url,
    /// Upper bound on a single request
    pub timeout: Duration,
    /// Cache and retry policy
    pub query: QueryConfig,
}

impl Config {
    /// Creates a configuration for the given base URL with default settings
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: DEFAULT_TIMEOUT,
            query: QueryConfig::default(),
        })
    }

    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup
    ///
    /// Useful for testing without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let mut config = Self::new(base_url.trim())?;

        if let Some(value) = lookup(TIMEOUT_VAR) {
            let secs = parse_number(TIMEOUT_VAR, &value)?;
            config.timeout = Duration::from_secs(u64::from(secs));
        }
        if let Some(value) = lookup(RETRY_VAR) {
            config.query.retry = parse_number(RETRY_VAR, &value)?;
        }

        Ok(config)
    }
}

/// Parses a base URL, appending a trailing slash so relative joins keep the path
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{}/", value)
    };

    let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: "not a base URL".to_string(),
        });
    }

    Ok(url)
}

fn parse_number(var: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}
