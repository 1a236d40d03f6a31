//! HTTP transport for the Star Wars API
//!
//! One `reqwest::Client` with a fixed base URL and request timeout. Every call
//! either decodes the expected JSON shape or returns a [`TransportError`].

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::TransportError;
use crate::config::Config;
use crate::data::ApiErrorBody;

/// Client for fetching records from the Star Wars API
#[derive(Debug, Clone)]
pub struct SwapiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Root of the API, ending in a slash
    base_url: Url,
}

impl SwapiClient {
    /// Creates a client from the runtime configuration
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Unexpected {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
        })
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    /// The configured API root
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a path relative to the API root
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Unexpected {
                reason: format!("invalid endpoint '{}': {}", path, e),
            })
    }

    /// Performs a GET request and decodes the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        debug!(url = %url, "GET");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<ApiErrorBody>(&text).ok());
            debug!(status = status.as_u16(), "request failed with server error");
            return Err(TransportError::Server {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(TransportError::from_reqwest)
    }
}
