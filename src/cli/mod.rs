//! CLI module for rache-redis
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution against the configured cache
//! - Command handlers for the demo flow and per-key operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Backend, Cli, Commands};

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::logger::{LogLevelHandle, init_logger};

/// Load configuration and apply CLI overrides
///
/// 1. Load base configuration from files and `RACHE_*` variables
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
pub fn load_and_merge_config(cli: &Cli) -> AppResult<Settings> {
    let merger = ConfigurationMerger::from_cli(cli)?;
    Ok(merger.merge_cli_args(cli)?)
}

/// Initialize logging from settings, then apply `--verbose` or `--quiet`
pub fn init_logger_from_settings(settings: &Settings, cli: &Cli) -> AppResult<LogLevelHandle> {
    let handle = init_logger(settings.logger.clone())?;
    if let Some(level) = cli.log_level_override() {
        handle.set_level(level)?;
        tracing::debug!(level, "log level set from the command line");
    }
    Ok(handle)
}
