//! Cache manager that builds the configured store and driver.

use std::sync::Arc;

use crate::cache::memory::MemoryStore;
use crate::cache::redis::RedisStore;
use crate::cache::{CacheDriver, CacheError, KvStore, RedisDriver};
use crate::config::settings::{CacheBackend, CacheConfig};

enum Backend {
    Redis(Arc<RedisStore>),
    Memory(Arc<MemoryStore>),
}

/// Owns the store selected by configuration and the driver wrapping it.
///
/// There is no global instance: callers hold the manager and hand
/// [`CacheManager::driver`] to whatever needs it.
pub struct CacheManager {
    backend: Backend,
    driver: Arc<dyn CacheDriver>,
    config: CacheConfig,
}

impl CacheManager {
    /// Connect the configured backend.
    pub async fn connect(config: CacheConfig) -> Result<Self, CacheError> {
        let backend = match config.backend {
            CacheBackend::Redis => Backend::Redis(Arc::new(RedisStore::connect(&config.redis).await?)),
            CacheBackend::Memory => {
                Backend::Memory(Arc::new(MemoryStore::with_capacity(config.memory.max_entries)))
            }
        };
        tracing::debug!(backend = ?config.backend, "cache backend ready");

        let driver: Arc<dyn CacheDriver> = match &backend {
            Backend::Redis(store) => Arc::new(RedisDriver::new(Arc::clone(store))),
            Backend::Memory(store) => Arc::new(RedisDriver::new(Arc::clone(store))),
        };

        Ok(Self {
            backend,
            driver,
            config,
        })
    }

    /// Get the driver for the configured backend.
    pub fn driver(&self) -> Arc<dyn CacheDriver> {
        Arc::clone(&self.driver)
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Connection status of the underlying store.
    pub fn status(&self) -> crate::cache::ConnectionStatus {
        match &self.backend {
            Backend::Redis(store) => store.status(),
            Backend::Memory(store) => store.status(),
        }
    }

    /// Close the underlying store. Drivers handed out earlier stop being
    /// usable.
    pub fn close(&self) {
        match &self.backend {
            Backend::Redis(store) => store.close(),
            Backend::Memory(store) => store.set_status(crate::cache::ConnectionStatus::Closed),
        }
    }
}
