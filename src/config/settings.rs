//! Settings tree deserialized from TOML files and `RACHE_*` variables.
//!
//! Every table and field is optional; missing values take the defaults
//! below, so an empty file yields [`Settings::default`].

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;

/// Store the driver talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

impl std::str::FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("redis") {
            Ok(Self::Redis)
        } else if s.eq_ignore_ascii_case("memory") {
            Ok(Self::Memory)
        } else {
            Err(ConfigError::validation(
                "cache.backend".to_string(),
                format!("unknown backend '{s}', expected redis or memory"),
            ))
        }
    }
}

/// How to reach the Redis server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// `redis://[:password@]host[:port][/db]`, or `rediss://` for TLS
    pub url: String,
    /// Upper bound on pooled connections
    pub pool_size: u32,
    /// Seconds to wait for a connection
    pub connection_timeout: u64,
    /// Must be set exactly when `url` is a `rediss://` URL
    pub tls_enabled: bool,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 4,
            connection_timeout: 5,
            tls_enabled: false,
        }
    }
}

/// Bounds for the in-process store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Keys held before the least recently used one is evicted
    pub max_entries: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

/// The `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis: RedisSettings,
    pub memory: MemorySettings,
}

/// Everything rache-redis reads at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub logger: LoggerConfig,
    pub cache: CacheConfig,
}
