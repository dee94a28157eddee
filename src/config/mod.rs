//! Settings for rache-redis.
//!
//! Sources, lowest priority first:
//! 1. `config/default.toml`
//! 2. `config/{environment}.toml`
//! 3. `config/local.toml`
//! 4. `RACHE_*` variables
//!
//! `RACHE_CONFIG_FILE` (or `--config`) replaces the three files with one.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::{ConfigLoader, ConfigSource};
pub use settings::{CacheBackend, CacheConfig, MemorySettings, RedisSettings, Settings};
