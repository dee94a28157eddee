//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use std::path::Path;

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{CacheBackend, ConfigLoader, Environment, settings::Settings};

/// Configuration merger that handles CLI argument integration with file-based configuration
///
/// CLI arguments override configuration file and environment values.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration the way the CLI asked for it
    ///
    /// `--config` switches the loader to single-file mode and `--env` picks the
    /// environment layer; without them the loader follows `RACHE_*` variables.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        Self::load(cli.config.as_deref(), cli.env)
    }

    fn load(
        config_path: Option<&Path>,
        environment: Option<Environment>,
    ) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;

        if let Some(path) = config_path {
            if !path.is_file() {
                return Err(ConfigError::validation(
                    "config_file".to_string(),
                    format!("Configuration file does not exist: '{}'", path.display()),
                ));
            }
            loader = loader.with_config_file(path);
        }

        if let Some(env) = environment {
            loader = loader.with_environment(env);
        }

        tracing::debug!(environment = %loader.environment(), "loading configuration");
        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Returns a new Settings instance with CLI overrides applied and validated.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if let Some(backend) = cli.backend {
            config.cache.backend = backend.into();
        }

        if let Some(ref url) = cli.url {
            config.cache.backend = CacheBackend::Redis;
            config.cache.redis.url = url.clone();
            config.cache.redis.tls_enabled = url.starts_with("rediss://");
        }

        config.validate()?;

        Ok(config)
    }

    /// Get the base configuration
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
