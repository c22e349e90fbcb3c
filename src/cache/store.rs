//! Cache Store Module
//!
//! The key/value mapping behind the shared `Cache` handle. All methods are
//! synchronous; locking is the caller's business.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;

// == Cache Store ==
/// Time-expiring key/value storage.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// TTL for entries set without explicit TTL
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL for entries without explicit TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a payload under `key`, replacing any previous entry.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The payload to store
    /// * `ttl` - Optional TTL (uses default_ttl if None, zero never expires)
    pub fn set(&mut self, key: String, value: Vec<u8>, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Set Many ==
    /// Stores every pair with the same TTL.
    pub fn set_many<I>(&mut self, pairs: I, ttl: Duration) -> usize
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let mut count = 0;
        for (key, value) in pairs {
            self.entries.insert(key, CacheEntry::new(value, ttl));
            count += 1;
        }
        count
    }

    // == Get ==
    /// Returns the payload if the entry exists and is live.
    ///
    /// Expired entries are left in place for the sweeper.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.value.as_slice())
    }

    // == Iterate ==
    /// Visits every physically-present entry, expired or not.
    ///
    /// Stops as soon as `visit` breaks.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &[u8]) -> ControlFlow<()>,
    {
        for (key, entry) in &self.entries {
            if visit(key, &entry.value).is_break() {
                break;
            }
        }
    }

    // == Sweep Expired ==
    /// Removes all entries that are no longer live at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live_at(now));
        before - self.entries.len()
    }

    // == Length ==
    /// Returns the number of physically-present entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
