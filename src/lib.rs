//! # BQE Core aggregation proxy
//!
//! Keeps a self-refreshing OAuth2 bearer token for the BQE Core API on disk
//! and serves a handful of read-only views built from paginated core API calls.
//!
//! Modules:
//! - `cache` — persisted token record and its file store
//! - `sources` — token manager (refresh-token grant) and authenticated core API client
//! - `aggregation` — clients, projects, per-client resources and time entries
//! - `server` — axum routes and server lifecycle

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::error::{ProxyError, ProxyResult};
