//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Vec<u8>,
    /// Insertion time on the runtime clock
    pub created_at: Instant,
    /// Lifetime of the entry, `Duration::ZERO` = no expiration
    pub ttl: Duration,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl` - Lifetime of the entry, zero for never expiring
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    // == Is Live ==
    /// Checks whether the entry may still be served at `now`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is still live;
    /// it expires only once the age strictly exceeds the TTL.
    pub fn is_live_at(&self, now: Instant) -> bool {
        self.ttl.is_zero() || now.saturating_duration_since(self.created_at) <= self.ttl
    }

    /// Checks whether the entry is live right now.
    pub fn is_live(&self) -> bool {
        self.is_live_at(Instant::now())
    }
}
