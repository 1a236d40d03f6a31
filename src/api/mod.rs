//! Star Wars API transport and accessors
//!
//! [`SwapiClient`] performs the HTTP calls; [`error_message`] is the single
//! place where a failed call becomes user-facing text.

mod client;
mod error;
mod resources;

pub use client::SwapiClient;
pub use error::{
    error_message, TransportError, NO_RESPONSE_MESSAGE, TIMEOUT_MESSAGE, UNEXPECTED_MESSAGE,
};
