//! CacheDriver trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::cache::{CacheBody, CacheError, CacheValue, EntryState};

/// Capability interface a storage backend implements to plug into the cache
/// orchestration layer.
///
/// `ttl` is in seconds; zero or negative means the value never expires.
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Report whether a key is absent, negatively cached or present.
    async fn exists(&self, key: &str) -> Result<EntryState, CacheError>;

    /// Read one key.
    async fn get(&self, key: &str) -> Result<CacheValue, CacheError>;

    /// Read many keys. The result has exactly one entry per distinct input key.
    async fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, CacheValue>, CacheError>;

    /// Write one key.
    async fn set(&self, key: &str, value: CacheBody, ttl: i64) -> Result<bool, CacheError>;

    /// Write many keys with a shared TTL.
    async fn set_multi(
        &self,
        values: HashMap<String, CacheBody>,
        ttl: i64,
    ) -> Result<bool, CacheError>;

    /// Remove one key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove many keys, returning how many existed.
    async fn remove_multi(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Whether the underlying connection is in its normal operating state.
    ///
    /// This reads the store's last known status and sends nothing. The
    /// status only changes as commands succeed or fail, so `true` means the
    /// last command got through, not that the next one will.
    fn usable(&self) -> bool;
}
