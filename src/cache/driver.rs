//! Tri-state cache driver over a key/value store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::value::expiry_seconds;
use crate::cache::{
    CacheBody, CacheDriver, CacheError, CacheValue, ConnectionStatus, EntryState, KvStore,
    RedisStore, WriteBatch,
};

/// Wrap a connected store into a cache driver.
pub fn create_redis_driver<S: KvStore>(store: S) -> RedisDriver<S> {
    RedisDriver::new(Arc::new(store))
}

/// Cache driver translating the tri-state value model onto the store's
/// present/absent model.
///
/// Negative markers are stored as zero-length values. Batch writes with a
/// TTL go through one pipeline because `MSET` cannot attach an expiry.
pub struct RedisDriver<S: KvStore = RedisStore> {
    store: Arc<S>,
}

impl<S: KvStore> Clone for RedisDriver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KvStore> RedisDriver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The store this driver talks to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[async_trait]
impl<S: KvStore + 'static> CacheDriver for RedisDriver<S> {
    async fn exists(&self, key: &str) -> Result<EntryState, CacheError> {
        let raw = self.store.get(key).await?;
        Ok(CacheValue::decode(raw).state())
    }

    async fn get(&self, key: &str) -> Result<CacheValue, CacheError> {
        let raw = self.store.get(key).await?;
        Ok(CacheValue::decode(raw))
    }

    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, CacheValue>, CacheError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let replies = self.store.multi_get(keys).await?;
        tracing::trace!(keys = keys.len(), replies = replies.len(), "multi get");

        // Slots missing from a short reply read as absent.
        let mut replies = replies.into_iter();
        let result = keys
            .iter()
            .map(|key| {
                let raw = replies.next().flatten();
                (key.clone(), CacheValue::decode(raw))
            })
            .collect();

        Ok(result)
    }

    async fn set(&self, key: &str, value: CacheBody, ttl: i64) -> Result<bool, CacheError> {
        let bytes = value.into_bytes();
        match expiry_seconds(ttl) {
            Some(seconds) => self.store.set_with_expiry(key, bytes, seconds).await?,
            None => self.store.set(key, bytes).await?,
        }
        Ok(true)
    }

    async fn set_multi(
        &self,
        values: HashMap<String, CacheBody>,
        ttl: i64,
    ) -> Result<bool, CacheError> {
        if values.is_empty() {
            return Ok(true);
        }

        match expiry_seconds(ttl) {
            None => {
                tracing::debug!(keys = values.len(), "bulk write without expiry");
                let items = values
                    .into_iter()
                    .map(|(key, body)| (key, body.into_bytes()))
                    .collect();
                self.store.multi_set(items).await?;
            }
            Some(seconds) => {
                let mut batch = WriteBatch::with_capacity(values.len());
                for (key, body) in values {
                    batch.set_with_expiry(key, body.into_bytes(), seconds);
                }
                tracing::debug!(keys = batch.len(), ttl = seconds, "pipelined write with expiry");
                self.store.submit(batch).await?;
            }
        }

        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.store.delete(&[key.to_string()]).await?;
        Ok(true)
    }

    async fn remove_multi(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        self.store.delete(keys).await
    }

    fn usable(&self) -> bool {
        self.store.status() == ConnectionStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn driver() -> RedisDriver<MemoryStore> {
        create_redis_driver(MemoryStore::new())
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_key_states() {
        let driver = driver();

        assert!(driver.set("u:1", CacheBody::payload("alice"), 0).await.unwrap());
        assert!(driver.set("u:2", CacheBody::NegativeMarker, 60).await.unwrap());

        assert_eq!(
            driver.get("u:1").await.unwrap(),
            CacheValue::Payload(b"alice".to_vec())
        );
        assert_eq!(driver.get("u:2").await.unwrap(), CacheValue::NegativeMarker);
        assert_eq!(driver.get("u:3").await.unwrap(), CacheValue::Unknown);
    }

    #[tokio::test]
    async fn test_exists() {
        let driver = driver();
        driver.set("hit", CacheBody::payload("x"), 0).await.unwrap();
        driver.set("miss", CacheBody::NegativeMarker, 0).await.unwrap();

        assert_eq!(driver.exists("hit").await.unwrap(), EntryState::Present);
        assert_eq!(driver.exists("miss").await.unwrap(), EntryState::Negative);
        assert_eq!(driver.exists("none").await.unwrap(), EntryState::Absent);
    }

    #[tokio::test]
    async fn test_set_picks_command_by_ttl() {
        let driver = driver();
        driver.set("a", CacheBody::payload("1"), 0).await.unwrap();
        driver.set("b", CacheBody::payload("1"), -3).await.unwrap();
        driver.set("c", CacheBody::payload("1"), 10).await.unwrap();

        let stats = driver.store().stats();
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.set_with_expiry, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let driver = driver();
        driver.set("k", CacheBody::payload("v"), 0).await.unwrap();

        assert!(driver.remove("k").await.unwrap());
        assert!(driver.remove("k").await.unwrap());
        assert_eq!(driver.get("k").await.unwrap(), CacheValue::Unknown);
    }

    #[tokio::test]
    async fn test_empty_batches_skip_the_store() {
        let driver = driver();

        assert!(driver.get_multi(&[]).await.unwrap().is_empty());
        assert!(driver.set_multi(HashMap::new(), 30).await.unwrap());
        assert_eq!(driver.remove_multi(&[]).await.unwrap(), 0);

        let stats = driver.store().stats();
        assert_eq!(stats.multi_gets + stats.pipelines + stats.deletes, 0);
    }

    #[tokio::test]
    async fn test_get_multi_with_duplicate_keys() {
        let driver = driver();
        driver.set("a", CacheBody::payload("1"), 0).await.unwrap();

        let result = driver.get_multi(&keys(&["a", "a", "b"])).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["a"], CacheValue::Payload(b"1".to_vec()));
        assert_eq!(result["b"], CacheValue::Unknown);
    }

    #[tokio::test]
    async fn test_usable_follows_store_status() {
        let driver = driver();
        assert!(driver.usable());

        driver.store().set_status(ConnectionStatus::Disconnected);
        assert!(!driver.usable());

        driver.store().set_status(ConnectionStatus::Normal);
        assert!(driver.usable());
    }
}
