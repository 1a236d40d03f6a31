//! SWAPI Explorer Library
//!
//! A read-only client for the Star Wars API: typed accessors, an in-memory
//! query cache with retry and incremental pagination, and text rendering.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod explorer;
pub mod render;
