//! Redis-backed cache driver with tri-state values.
//!
//! The orchestration layer above this module needs three answers for a key:
//! never looked up, confirmed missing, or present with data. Redis only has
//! two. [`RedisDriver`] bridges them by storing the negative marker as an
//! empty string.
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! backend = "redis"  # or "memory"
//!
//! [cache.redis]
//! url = "redis://:password@127.0.0.1:6379/0"
//! pool_size = 4
//! connection_timeout = 5
//! tls_enabled = false
//!
//! [cache.memory]
//! max_entries = 100000
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let store = RedisStore::connect(&settings.cache.redis).await?;
//! let driver = create_redis_driver(store);
//!
//! driver.set("user:2", CacheBody::NegativeMarker, 60).await?;
//! assert_eq!(driver.get("user:2").await?, CacheValue::NegativeMarker);
//! ```

mod batch;
mod driver;
mod error;
mod manager;
mod memory;
mod redis;
mod store;
mod traits;
pub mod value;

pub use batch::{WriteBatch, WriteIntent};
pub use driver::{RedisDriver, create_redis_driver};
pub use error::CacheError;
pub use manager::CacheManager;
pub use memory::{DEFAULT_MAX_ENTRIES, MemoryStore, StoreStats};
pub use self::redis::RedisStore;
pub use store::{ConnectionStatus, KvStore};
pub use traits::CacheDriver;
pub use value::{CacheBody, CacheValue, EntryState};

// Re-export config types
pub use crate::config::settings::{CacheBackend, CacheConfig, MemorySettings, RedisSettings};
