//! Application Context
//!
//! Owns everything one running session needs. Built once in `main` and passed
//! by reference to the command layer.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::config::Config;
use crate::error::Result;
use crate::snapshot;

/// One session's cache, configuration and sweeper shutdown token.
#[derive(Debug)]
pub struct AppContext {
    config: Config,
    cache: Cache,
    shutdown: CancellationToken,
}

impl AppContext {
    /// Builds the cache and restores the snapshot before any command runs.
    ///
    /// On a snapshot error the sweeper is stopped before the error is returned.
    pub async fn start(config: Config) -> Result<Self> {
        let shutdown = CancellationToken::new();
        let cache = Cache::from_config(&config, shutdown.clone());

        let loaded = match snapshot::load(&cache, &config.snapshot_path).await {
            Ok(loaded) => loaded,
            Err(err) => {
                shutdown.cancel();
                return Err(err);
            }
        };
        info!(
            "Restored {} durable entries from {}",
            loaded,
            config.snapshot_path.display()
        );

        Ok(Self {
            config,
            cache,
            shutdown,
        })
    }

    /// Saves the durable subset and stops the sweeper.
    ///
    /// Calling it again rewrites the same snapshot; the sweeper stays stopped.
    pub async fn shutdown(&self) -> Result<usize> {
        let result = snapshot::save(
            &self.cache,
            &self.config.snapshot_path,
            snapshot::prefix_predicate(self.config.durable_prefix.as_str()),
        )
        .await;
        self.shutdown.cancel();
        debug!("Sweeper cancelled");
        result
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cache key of the durable record for `name`.
    pub fn durable_key(&self, name: &str) -> String {
        format!("{}{}", self.config.durable_prefix, name)
    }
}
