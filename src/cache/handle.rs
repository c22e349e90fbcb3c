//! Shared Cache Handle
//!
//! Thread-safe front for `CacheStore`. Every operation holds the lock for
//! exactly one logical step and never across I/O.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::tasks::spawn_sweeper;

// == Cache ==
/// Cloneable handle to a shared, periodically swept cache.
///
/// Reads (`get`, `iterate`) share the lock; writes (`set`, sweeping, snapshot
/// loads) take it exclusively.
#[derive(Clone, Debug)]
pub struct Cache {
    store: Arc<RwLock<CacheStore>>,
}

impl Cache {
    /// Creates an empty cache and starts its background sweeper.
    ///
    /// The sweeper runs every `sweep_interval` until `shutdown` is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn new(default_ttl: Duration, sweep_interval: Duration, shutdown: CancellationToken) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(default_ttl)));
        spawn_sweeper(Arc::clone(&store), sweep_interval, shutdown);
        Self { store }
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &Config, shutdown: CancellationToken) -> Self {
        Self::new(config.default_ttl(), config.sweep_interval(), shutdown)
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// `None` uses the configured default TTL; `Some(Duration::ZERO)` never expires.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<Vec<u8>>, ttl: Option<Duration>) {
        self.store.write().await.set(key.into(), value.into(), ttl);
    }

    /// Returns a copy of the payload if `key` holds a live entry.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.store.read().await.get(key).map(<[u8]>::to_vec)
    }

    /// Visits every physically-present entry in unspecified order.
    ///
    /// Entries past their TTL but not yet swept are visited too; callers that
    /// need liveness must check it with `get`. The visitor runs under the read
    /// lock, so it must not call back into this cache for writing.
    pub async fn iterate<F>(&self, visit: F)
    where
        F: FnMut(&str, &[u8]) -> ControlFlow<()>,
    {
        self.store.read().await.iterate(visit);
    }

    /// Number of physically-present entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if no entries are present.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Inserts a batch under one write lock so readers see all or none of it.
    pub(crate) async fn set_many(&self, pairs: Vec<(String, Vec<u8>)>, ttl: Duration) -> usize {
        self.store.write().await.set_many(pairs, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(default_ttl: Duration, sweep_interval: Duration) -> (Cache, CancellationToken) {
        let token = CancellationToken::new();
        let cache = Cache::new(default_ttl, sweep_interval, token.clone());
        (cache, token)
    }

    #[tokio::test]
    async fn test_cache_set_and_get() {
        let (cache, token) = test_cache(Duration::from_secs(300), Duration::from_secs(60));

        cache.set("key1", b"value1".to_vec(), None).await;

        assert_eq!(cache.get("key1").await, Some(b"value1".to_vec()));
        assert!(cache.get("missing").await.is_none());
        token.cancel();
    }

    #[tokio::test]
    async fn test_cache_clones_share_storage() {
        let (cache, token) = test_cache(Duration::from_secs(300), Duration::from_secs(60));
        let other = cache.clone();

        other.set("shared", "payload", None).await;

        assert_eq!(cache.get("shared").await, Some(b"payload".to_vec()));
        assert_eq!(cache.len().await, 1);
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expired_entry_hidden_before_sweep() {
        let (cache, token) = test_cache(Duration::from_secs(300), Duration::from_secs(3600));

        cache.set("short", "v", Some(Duration::from_secs(1))).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        assert!(cache.get("short").await.is_none());
        assert_eq!(cache.len().await, 1, "only the sweeper removes entries");
        token.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_sweeper_removes_expired_entries() {
        let (cache, token) = test_cache(Duration::from_secs(300), Duration::from_secs(1));

        cache.set("short", "v", Some(Duration::from_secs(1))).await;
        cache.set("forever", "v", Some(Duration::ZERO)).await;

        tokio::time::sleep(Duration::from_millis(2500)).await;

        let mut keys = Vec::new();
        cache
            .iterate(|key, _| {
                keys.push(key.to_string());
                ControlFlow::Continue(())
            })
            .await;
        assert_eq!(keys, vec!["forever".to_string()]);
        token.cancel();
    }

    #[tokio::test]
    async fn test_cache_set_many_is_visible() {
        let (cache, token) = test_cache(Duration::from_secs(300), Duration::from_secs(60));

        let inserted = cache
            .set_many(
                vec![("a".to_string(), vec![1]), ("b".to_string(), vec![2])],
                Duration::ZERO,
            )
            .await;

        assert_eq!(inserted, 2);
        assert_eq!(cache.get("b").await, Some(vec![2]));
        token.cancel();
    }
}
