//! Snapshot Persistence Module
//!
//! Saves the durable subset of a cache to a flat file and restores it at
//! startup. The module only talks to the cache through its public handle.
//!
//! Saving collects the selected entries under the read lock, releases it and
//! then writes a uniquely named temp file beside `path` before renaming it
//! over `path`, so overlapping saves never share a temp file. Loading decodes
//! the whole file before taking the write lock, so a malformed file leaves the
//! cache exactly as it was.

mod format;

use std::io::{self, ErrorKind, Write};
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::cache::Cache;
use crate::error::{CacheError, Result};

pub use format::{Payload, SnapshotDocument};

/// TTL given to every reloaded entry: 100 years.
pub const PERMANENT_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Builds a predicate selecting keys that start with `prefix`.
pub fn prefix_predicate(prefix: impl Into<String>) -> impl Fn(&str) -> bool {
    let prefix = prefix.into();
    move |key: &str| key.starts_with(prefix.as_str())
}

/// Writes every entry whose key satisfies `is_durable` to `path`.
///
/// Expired-but-unswept entries are included, matching `Cache::iterate`.
/// The cache is never modified. Returns the number of entries written.
pub async fn save<P>(cache: &Cache, path: impl AsRef<Path>, is_durable: P) -> Result<usize>
where
    P: Fn(&str) -> bool,
{
    let path = path.as_ref();

    let mut document = SnapshotDocument::new();
    cache
        .iterate(|key, value| {
            if is_durable(key) {
                document.insert(key.to_string(), Payload(value.to_vec()));
            }
            ControlFlow::Continue(())
        })
        .await;

    let count = document.len();
    let data = serde_json::to_vec(&document).map_err(CacheError::SnapshotEncode)?;

    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomically(&target, &data))
        .await
        .map_err(|err| io::Error::new(ErrorKind::Other, err))
        .and_then(|written| written)
        .map_err(|source| CacheError::SnapshotWrite {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), entries = count, "Snapshot saved");
    Ok(count)
}

/// Restores the entries stored at `path` with `PERMANENT_TTL`.
///
/// A missing file is not an error and loads nothing. Returns the number of
/// entries inserted.
pub async fn load(cache: &Cache, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();

    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No snapshot found");
            return Ok(0);
        }
        Err(source) => {
            return Err(CacheError::SnapshotRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let document: SnapshotDocument =
        serde_json::from_slice(&data).map_err(|source| CacheError::SnapshotDecode {
            path: path.to_path_buf(),
            source,
        })?;

    let pairs = document
        .into_iter()
        .map(|(key, Payload(value))| (key, value))
        .collect();
    let count = cache.set_many(pairs, PERMANENT_TTL).await;

    debug!(path = %path.display(), entries = count, "Snapshot loaded");
    Ok(count)
}

/// Writes `data` to a fresh temp file in the target directory and renames it
/// over `path`. The temp file is removed if anything fails.
fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn test_cache() -> (Cache, CancellationToken) {
        let token = CancellationToken::new();
        let cache = Cache::new(Duration::from_secs(300), Duration::from_secs(60), token.clone());
        (cache, token)
    }

    #[test]
    fn test_prefix_predicate() {
        let is_durable = prefix_predicate("caught:");
        assert!(is_durable("caught:pikachu"));
        assert!(!is_durable("location:route1"));
        assert!(!is_durable("xcaught:pikachu"));
    }

    #[test]
    fn test_permanent_ttl_spans_decades() {
        assert!(PERMANENT_TTL > Duration::from_secs(50 * 365 * 24 * 60 * 60));
    }

    #[tokio::test]
    async fn test_save_writes_only_durable_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pokedex.json");
        let (cache, token) = test_cache();

        cache.set("caught:pikachu", "A", None).await;
        cache.set("location:route1", "C", None).await;

        let written = save(&cache, &path, prefix_predicate("caught:")).await.unwrap();
        assert_eq!(written, 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"caught:pikachu":"QQ=="}"#);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "no temp file should remain");
        // Save is read-only with respect to the cache
        assert_eq!(cache.len().await, 2);
        token.cancel();
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("pokedex.json");
        let (cache, token) = test_cache();
        cache.set("caught:pikachu", "A", None).await;

        let result = save(&cache, &path, prefix_predicate("caught:")).await;

        assert!(matches!(result, Err(CacheError::SnapshotWrite { .. })));
        assert_eq!(cache.get("caught:pikachu").await, Some(b"A".to_vec()));
        token.cancel();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_saves_both_succeed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pokedex.json");
        let (cache, token) = test_cache();
        cache.set("caught:pikachu", "A", None).await;
        cache.set("caught:eevee", "B", None).await;

        for _ in 0..50 {
            let (first, second) = tokio::join!(
                save(&cache, &path, prefix_predicate("caught:")),
                save(&cache, &path, prefix_predicate("caught:")),
            );
            assert_eq!(first.unwrap(), 2);
            assert_eq!(second.unwrap(), 2);
        }

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"caught:eevee":"Qg==","caught:pikachu":"QQ=="}"#
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        token.cancel();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let (cache, token) = test_cache();

        let loaded = load(&cache, dir.path().join("absent.json")).await.unwrap();

        assert_eq!(loaded, 0);
        assert!(cache.is_empty().await);
        token.cancel();
    }

    #[tokio::test]
    async fn test_load_malformed_file_leaves_cache_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pokedex.json");
        // First value decodes, second does not
        std::fs::write(&path, r#"{"caught:eevee":"QQ==","caught:pikachu":"%%%"}"#).unwrap();

        let (cache, token) = test_cache();
        cache.set("location:route1", "C", None).await;

        let result = load(&cache, &path).await;

        assert!(matches!(result, Err(CacheError::SnapshotDecode { .. })));
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("caught:eevee").await.is_none());
        token.cancel();
    }

    #[tokio::test]
    async fn test_load_directory_is_read_error() {
        let dir = TempDir::new().unwrap();
        let (cache, token) = test_cache();

        let result = load(&cache, dir.path()).await;

        assert!(matches!(result, Err(CacheError::SnapshotRead { .. })));
        token.cancel();
    }

    #[tokio::test]
    async fn test_load_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pokedex.json");
        std::fs::write(&path, r#"{"caught:eevee":"Qg=="}"#).unwrap();
        let (cache, token) = test_cache();

        load(&cache, &path).await.unwrap();
        load(&cache, &path).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("caught:eevee").await, Some(b"B".to_vec()));
        token.cancel();
    }
}
