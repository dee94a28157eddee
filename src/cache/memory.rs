//! In-process store speaking the same primitives as Redis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cached::{CanExpire, Cached, ExpiringValueCache};

use crate::cache::store::StatusCell;
use crate::cache::{CacheError, ConnectionStatus, KvStore, WriteBatch};

/// Keys held before the least recently used one is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

type Entries = ExpiringValueCache<String, StoredValue>;

struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CanExpire for StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Number of primitive calls a [`MemoryStore`] has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub gets: u64,
    pub multi_gets: u64,
    pub sets: u64,
    pub set_with_expiry: u64,
    pub multi_sets: u64,
    pub deletes: u64,
    pub pipelines: u64,
    pub pipelined_commands: u64,
}

#[derive(Default)]
struct Counters {
    gets: AtomicU64,
    multi_gets: AtomicU64,
    sets: AtomicU64,
    set_with_expiry: AtomicU64,
    multi_sets: AtomicU64,
    deletes: AtomicU64,
    pipelines: AtomicU64,
    pipelined_commands: AtomicU64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

/// Key/value store backed by a size-bounded [`ExpiringValueCache`].
///
/// Expired keys read as absent. Every write flushes expired keys, so a
/// burst of short-lived entries does not outlive its TTL in memory. Once
/// `capacity` live keys are held the least recently used one is evicted,
/// the way a Redis server with an LRU `maxmemory-policy` behaves.
pub struct MemoryStore {
    entries: Mutex<Entries>,
    status: StatusCell,
    counters: Counters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store holding at most `capacity` keys (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(ExpiringValueCache::with_size(capacity.max(1))),
            status: StatusCell::new(ConnectionStatus::Normal),
            counters: Counters::default(),
        }
    }

    /// Force a connection status, e.g. to take the store out of rotation.
    pub fn set_status(&self, status: ConnectionStatus) {
        let prev = self.status.transition(status);
        if prev != status && prev != ConnectionStatus::Closed {
            tracing::info!(from = %prev, to = %status, "memory store status changed");
        }
    }

    pub fn stats(&self) -> StoreStats {
        let c = &self.counters;
        StoreStats {
            gets: c.gets.load(Ordering::Relaxed),
            multi_gets: c.multi_gets.load(Ordering::Relaxed),
            sets: c.sets.load(Ordering::Relaxed),
            set_with_expiry: c.set_with_expiry.load(Ordering::Relaxed),
            multi_sets: c.multi_sets.load(Ordering::Relaxed),
            deletes: c.deletes.load(Ordering::Relaxed),
            pipelines: c.pipelines.load(Ordering::Relaxed),
            pipelined_commands: c.pipelined_commands.load(Ordering::Relaxed),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.flush();
        entries.cache_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        match self.status.get() {
            ConnectionStatus::Closed => Err(CacheError::Closed),
            ConnectionStatus::Disconnected => {
                Err(CacheError::connection("memory store is disconnected"))
            }
            _ => Ok(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, CacheError> {
        self.entries
            .lock()
            .map_err(|e| CacheError::connection(e.to_string()))
    }

    /// Lock the entries for writing, dropping whatever has expired.
    fn lock_for_write(&self) -> Result<MutexGuard<'_, Entries>, CacheError> {
        let mut entries = self.lock()?;
        entries.flush();
        Ok(entries)
    }
}

fn stored(bytes: Vec<u8>, expiry: Option<u64>) -> StoredValue {
    StoredValue {
        bytes,
        // An expiry past what `Instant` can represent never elapses.
        expires_at: expiry.and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs))),
    }
}

fn read(entries: &mut Entries, key: &str) -> Option<Vec<u8>> {
    entries.cache_get(key).map(|v| v.bytes.clone())
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.ensure_open()?;
        bump(&self.counters.gets, 1);
        Ok(read(&mut *self.lock()?, key))
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError> {
        self.ensure_open()?;
        bump(&self.counters.multi_gets, 1);
        let mut entries = self.lock()?;
        Ok(keys.iter().map(|k| read(&mut entries, k)).collect())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        self.ensure_open()?;
        bump(&self.counters.sets, 1);
        self.lock_for_write()?
            .cache_set(key.to_string(), stored(value, None));
        Ok(())
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        seconds: u64,
    ) -> Result<(), CacheError> {
        self.ensure_open()?;
        bump(&self.counters.set_with_expiry, 1);
        self.lock_for_write()?
            .cache_set(key.to_string(), stored(value, Some(seconds)));
        Ok(())
    }

    async fn multi_set(&self, items: Vec<(String, Vec<u8>)>) -> Result<(), CacheError> {
        self.ensure_open()?;
        bump(&self.counters.multi_sets, 1);
        let mut entries = self.lock_for_write()?;
        for (key, value) in items {
            entries.cache_set(key, stored(value, None));
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        self.ensure_open()?;
        bump(&self.counters.deletes, 1);
        let mut entries = self.lock_for_write()?;
        let removed = keys
            .iter()
            .filter_map(|k| entries.cache_remove(k.as_str()))
            .filter(|v| !v.is_expired())
            .count();
        Ok(removed as u64)
    }

    async fn submit(&self, batch: WriteBatch) -> Result<(), CacheError> {
        self.ensure_open()?;
        bump(&self.counters.pipelines, 1);
        bump(&self.counters.pipelined_commands, batch.len() as u64);
        let mut entries = self.lock_for_write()?;
        for intent in batch {
            entries.cache_set(intent.key, stored(intent.value, Some(intent.expiry_seconds)));
        }
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        self.status.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set() {
        let store = MemoryStore::new();
        store.set("key", b"value".to_vec()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_empty_value_is_present() {
        let store = MemoryStore::new();
        store.set("key", Vec::new()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let store = MemoryStore::new();
        store.set_with_expiry("key", b"value".to_vec(), 1).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(b"value".to_vec()));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get("key").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_counts_existing_keys() {
        let store = MemoryStore::new();
        store.set("a", b"1".to_vec()).await.unwrap();
        store.set("b", Vec::new()).await.unwrap();

        let keys = vec!["a".to_string(), "b".to_string(), "missing".to_string()];
        assert_eq!(store.delete(&keys).await.unwrap(), 2);
        assert_eq!(store.delete(&keys).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_multi_get_is_positional() {
        let store = MemoryStore::new();
        store.set("b", b"2".to_vec()).await.unwrap();

        let keys = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            store.multi_get(&keys).await.unwrap(),
            vec![None, Some(b"2".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_submit_counts_one_pipeline() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch
            .set_with_expiry("a", b"1".to_vec(), 30)
            .set_with_expiry("b", b"2".to_vec(), 30);
        store.submit(batch).await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.pipelines, 1);
        assert_eq!(stats.pipelined_commands, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_writes_purge_expired_keys() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        for i in 0..1000 {
            batch.set_with_expiry(format!("short:{i}"), b"x".to_vec(), 1);
        }
        store.submit(batch).await.unwrap();
        assert_eq!(store.entries.lock().unwrap().cache_size(), 1000);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        store.set("unrelated", b"v".to_vec()).await.unwrap();

        assert_eq!(store.entries.lock().unwrap().cache_size(), 1);
        assert_eq!(store.get("unrelated").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_ignores_expired_keys() {
        let store = MemoryStore::new();
        store.set_with_expiry("gone", b"v".to_vec(), 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.delete(&["gone".to_string()]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_huge_expiry_does_not_overflow() {
        let store = MemoryStore::new();
        store.set_with_expiry("k", b"v".to_vec(), u64::MAX).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let store = MemoryStore::with_capacity(2);
        store.set("a", b"1".to_vec()).await.unwrap();
        store.set("b", b"2".to_vec()).await.unwrap();
        store.get("a").await.unwrap();
        store.set("c", b"3".to_vec()).await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_closed_store_rejects_commands() {
        let store = MemoryStore::new();
        store.set_status(ConnectionStatus::Closed);
        assert!(matches!(store.get("k").await, Err(CacheError::Closed)));
        assert_eq!(store.stats().gets, 0);
    }
}
