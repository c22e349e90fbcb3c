//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and takes the write lock
/// only for the duration of one sweep. It exits at the next wake-up after
/// `shutdown` is cancelled.
///
/// # Arguments
/// * `store` - shared reference to the cache storage
/// * `interval` - time between sweeps
/// * `shutdown` - token that stops the task
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(Duration::from_secs(1800))));
/// let token = CancellationToken::new();
/// let handle = spawn_sweeper(store.clone(), Duration::from_secs(300), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// handle.await?;
/// ```
pub(crate) fn spawn_sweeper(
    store: Arc<RwLock<CacheStore>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(interval_secs = interval.as_secs_f64(), "Starting expiry sweeper");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = {
                let mut guard = store.write().await;
                guard.sweep_expired(Instant::now())
            };

            if removed > 0 {
                debug!("Sweep: removed {} expired entries", removed);
            }
        }

        debug!("Expiry sweeper stopped");
    })
}
