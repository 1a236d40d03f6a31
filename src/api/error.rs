//! Transport failures and their user-facing messages

use thiserror::Error;

use crate::data::ApiErrorBody;

/// Message shown when a request was sent but never answered
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Check your internet connection.";

/// Message shown when a request exceeded the configured timeout
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Message shown for any failure that fits no other category
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Errors that can occur while talking to the API
///
/// The variants are mutually exclusive; [`error_message`] turns any of them
/// into display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status
    #[error("Server returned HTTP {status}")]
    Server {
        status: u16,
        /// Decoded error body, if the server sent one
        body: Option<ApiErrorBody>,
    },

    /// The request was sent but no response arrived
    #[error("No response from server: {reason}")]
    NoResponse { reason: String },

    /// The request was aborted after exceeding the timeout
    #[error("Request timed out")]
    Timeout,

    /// Anything else: undecodable payloads, invalid URLs, client setup
    #[error("Unexpected transport failure: {reason}")]
    Unexpected { reason: String },
}

impl TransportError {
    /// Classifies a `reqwest` failure that happened before a status was seen
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() || error.is_request() {
            TransportError::NoResponse {
                reason: error.to_string(),
            }
        } else {
            TransportError::Unexpected {
                reason: error.to_string(),
            }
        }
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Server { status: 404, .. })
    }
}

/// Converts a transport failure into the message shown to the user
///
/// Never fails. For server errors the body's `detail` wins over its
/// `message`; without either the status code is reported.
pub fn error_message(error: &TransportError) -> String {
    match error {
        TransportError::Server { status, body } => body
            .as_ref()
            .and_then(|b| b.detail.clone().or_else(|| b.message.clone()))
            .unwrap_or_else(|| format!("API Error: {}", status)),
        TransportError::NoResponse { .. } => NO_RESPONSE_MESSAGE.to_string(),
        TransportError::Timeout => TIMEOUT_MESSAGE.to_string(),
        TransportError::Unexpected { .. } => UNEXPECTED_MESSAGE.to_string(),
    }
}
