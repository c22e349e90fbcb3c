//! Pokecache - A time-expiring byte cache
//!
//! Memoizes fetched payloads with per-entry TTL, sweeps expired entries in the
//! background and persists a durable subset of entries to a snapshot file.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod snapshot;
mod tasks;

pub use app::AppContext;
pub use cache::Cache;
pub use config::Config;
