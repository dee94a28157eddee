//! Redis store using a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};

use crate::cache::error::is_transport_error;
use crate::cache::store::StatusCell;
use crate::cache::{CacheError, ConnectionStatus, KvStore, WriteBatch};
use crate::config::settings::RedisSettings;

type RedisPool = Pool<Client>;

/// Redis client handle with bb8 connection pool.
///
/// [`KvStore::status`] answers without a round trip: it reports the outcome
/// of the most recent command (the `PING` in [`RedisStore::connect`] at
/// first). Nothing checks the server in the background, so a server that
/// went away since the last command still reads as `Normal` until the next
/// command fails, and a `Disconnected` store recovers only when a later
/// command succeeds. Call [`RedisStore::ping`] to refresh it on demand.
pub struct RedisStore {
    pool: RedisPool,
    status: StatusCell,
}

impl RedisStore {
    /// Open a pool against `settings.url` and confirm the server answers.
    ///
    /// Credentials belong in the URL (`redis://:password@host:6379/0`) so
    /// that every pooled connection authenticates on its own.
    pub async fn connect(settings: &RedisSettings) -> Result<Self, CacheError> {
        let client = Client::open(settings.url.as_str())
            .map_err(|e| CacheError::connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(settings.pool_size)
            .connection_timeout(Duration::from_secs(settings.connection_timeout))
            .build(client)
            .await
            .map_err(|e| CacheError::connection(e.to_string()))?;

        let store = Self {
            pool,
            status: StatusCell::new(ConnectionStatus::Connecting),
        };
        store.ping().await?;
        tracing::info!(pool_size = settings.pool_size, "redis store connected");

        Ok(store)
    }

    /// Round trip a `PING`.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result: RedisResult<String> = redis::cmd("PING").query_async(conn_ref).await;
        self.track(result).map(|_| ())
    }

    /// Mark the store closed. Later commands fail with [`CacheError::Closed`].
    pub fn close(&self) {
        if self.status.transition(ConnectionStatus::Closed) != ConnectionStatus::Closed {
            tracing::info!("redis store closed");
        }
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        if self.status.get() == ConnectionStatus::Closed {
            return Err(CacheError::Closed);
        }
        self.pool.get().await.map_err(|e| {
            self.mark(ConnectionStatus::Disconnected);
            CacheError::connection(e.to_string())
        })
    }

    fn track<T>(&self, result: RedisResult<T>) -> Result<T, CacheError> {
        match result {
            Ok(value) => {
                self.mark(ConnectionStatus::Normal);
                Ok(value)
            }
            Err(e) => {
                self.observe_error(&e);
                Err(CacheError::Operation(e))
            }
        }
    }

    fn observe_error(&self, e: &RedisError) {
        if is_transport_error(e) {
            self.mark(ConnectionStatus::Disconnected);
        }
    }

    fn mark(&self, next: ConnectionStatus) {
        let prev = self.status.transition(next);
        if prev == next || prev == ConnectionStatus::Closed {
            return;
        }
        match next {
            ConnectionStatus::Disconnected => {
                tracing::warn!(from = %prev, "redis connection lost");
            }
            ConnectionStatus::Normal if prev == ConnectionStatus::Disconnected => {
                tracing::info!("redis connection recovered");
            }
            _ => tracing::debug!(from = %prev, to = %next, "redis status changed"),
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result = conn_ref.get(key).await;
        self.track(result)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        // Always MGET so a single key still replies with an array.
        let result = redis::cmd("MGET").arg(keys).query_async(conn_ref).await;
        self.track(result)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result = conn_ref.set::<_, _, ()>(key, value.as_slice()).await;
        self.track(result)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: Vec<u8>,
        seconds: u64,
    ) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result = conn_ref
            .set_ex::<_, _, ()>(key, value.as_slice(), seconds)
            .await;
        self.track(result)
    }

    async fn multi_set(&self, items: Vec<(String, Vec<u8>)>) -> Result<(), CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result = conn_ref.mset::<_, _, ()>(&items).await;
        self.track(result)
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError> {
        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result = conn_ref.del(keys).await;
        self.track(result)
    }

    async fn submit(&self, batch: WriteBatch) -> Result<(), CacheError> {
        let queued = batch.len();
        let mut pipe = redis::pipe();
        for intent in batch.intents() {
            pipe.set_ex(&intent.key, intent.value.as_slice(), intent.expiry_seconds)
                .ignore();
        }

        let mut conn = self.get_conn().await?;
        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let result: RedisResult<()> = pipe.query_async(conn_ref).await;
        match result {
            Ok(()) => {
                self.mark(ConnectionStatus::Normal);
                Ok(())
            }
            Err(source) => {
                self.observe_error(&source);
                tracing::warn!(queued, error = %source, "pipeline failed");
                Err(CacheError::Pipeline { queued, source })
            }
        }
    }

    fn status(&self) -> ConnectionStatus {
        self.status.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A store whose pool never dialed out; only status tracking is exercised.
    fn unconnected_store() -> RedisStore {
        let client = Client::open("redis://127.0.0.1:1").unwrap();
        RedisStore {
            pool: Pool::builder().build_unchecked(client),
            status: StatusCell::new(ConnectionStatus::Normal),
        }
    }

    fn reset() -> RedisError {
        RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))
    }

    #[tokio::test]
    async fn test_status_follows_last_command_outcome() {
        let store = unconnected_store();
        assert_eq!(store.status(), ConnectionStatus::Normal);

        assert!(store.track::<()>(Err(reset())).is_err());
        assert_eq!(store.status(), ConnectionStatus::Disconnected);

        assert!(store.track(Ok(())).is_ok());
        assert_eq!(store.status(), ConnectionStatus::Normal);
    }

    #[tokio::test]
    async fn test_closed_ignores_later_outcomes() {
        let store = unconnected_store();
        store.close();

        assert!(store.track(Ok(())).is_ok());
        store.observe_error(&reset());
        assert_eq!(store.status(), ConnectionStatus::Closed);
        assert!(matches!(store.get("k").await, Err(CacheError::Closed)));
    }
}
