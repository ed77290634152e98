//! Registry of named datasources.
//!
//! Maps an identity to a lazily connected pool. Readers and writers on
//! different identities never contend: the map is sharded, and a lookup hands
//! out a cheap clone of the pool handle so no shard lock is held while a query
//! runs.

use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::{DEFAULT_IDENTITY, PoolConfig};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A registered pool together with the configuration it was built from.
#[derive(Debug, Clone)]
pub struct PoolHandle {
    pub pool: DbPool,
    pub config: Arc<PoolConfig>,
}

/// Concurrent identity → pool map.
#[derive(Debug, Default)]
pub struct DataSourceRegistry {
    pools: DashMap<String, PoolHandle>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool for `config` and bind it to `identity`.
    ///
    /// Replaces any existing binding. The superseded pool is closed in the
    /// background once its borrowed connections come back. The identity is
    /// stored exactly as given.
    pub fn register(&self, identity: &str, config: PoolConfig) -> DbResult<()> {
        if identity.is_empty() {
            return Err(DbError::configuration("identity must not be empty"));
        }

        let pool = DbPool::connect_lazy(&config)?;
        info!(
            identity,
            driver = %config.driver,
            url = %config.masked_url(),
            max_pool_size = config.max_pool_size,
            "Registered datasource"
        );

        let handle = PoolHandle {
            pool,
            config: Arc::new(config),
        };
        if let Some(previous) = self.pools.insert(identity.to_string(), handle) {
            warn!(identity, "Closing superseded pool");
            close_in_background(previous.pool);
        }
        Ok(())
    }

    /// Find the pool bound to `identity`.
    pub fn lookup(&self, identity: &str) -> Option<PoolHandle> {
        self.pools.get(identity).map(|entry| entry.value().clone())
    }

    /// Like `lookup`, but an absent identity is an error.
    pub fn require(&self, identity: &str) -> DbResult<PoolHandle> {
        self.lookup(identity)
            .ok_or_else(|| DbError::unknown_data_source(identity))
    }

    /// Register `config` under the default identity.
    pub fn bootstrap_default(&self, config: PoolConfig) -> DbResult<()> {
        self.register(DEFAULT_IDENTITY, config)
    }

    /// Registered identities, sorted.
    pub fn identities(&self) -> Vec<String> {
        let mut identities: Vec<String> =
            self.pools.iter().map(|entry| entry.key().clone()).collect();
        identities.sort();
        identities
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Remove every binding and close its pool.
    pub async fn close_all(&self) {
        let identities = self.identities();
        for identity in identities {
            if let Some((_, handle)) = self.pools.remove(&identity) {
                handle.pool.close().await;
                debug!(identity = %identity, "Closed pool");
            }
        }
    }
}

fn close_in_background(pool: DbPool) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move { pool.close().await });
        }
        // Without a runtime the pool is dropped; idle connections close with it.
        Err(_) => drop(pool),
    }
}
