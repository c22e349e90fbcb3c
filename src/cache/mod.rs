//! Cache Module
//!
//! Provides in-memory caching of byte payloads with per-entry TTL expiration.
//!
//! Only [`Cache`] is public. The store behind it and its sweeper stay
//! internal, so storage is reachable only through the locked handle:
//!
//! ```compile_fail
//! use pokecache::cache::CacheStore;
//! ```
//!
//! ```compile_fail
//! use pokecache::tasks::spawn_sweeper;
//! ```

mod entry;
mod handle;
mod store;


// Re-export public types
pub(crate) use entry::CacheEntry;
pub use handle::Cache;
pub(crate) use store::CacheStore;
