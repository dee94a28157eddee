//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;
use crate::config::{CacheBackend, Environment};

/// Tri-state cache driver over Redis
#[derive(Parser, Debug)]
#[command(name = "rache-redis")]
#[command(about = "Tri-state cache driver over Redis")]
#[command(long_about = "
rache-redis stores cache entries in Redis while keeping three states apart:
never looked up, confirmed missing (negative marker) and present with data.
The commands below drive the adapter directly against the configured store.

EXAMPLES:
    # Check whether the configured store is usable
    rache-redis status

    # Write and read a value
    rache-redis set user:1 '{\"name\":\"alice\"}' --ttl 3600
    rache-redis get user:1 user:2 user:3

    # Remember that keys do not exist in the source of truth
    rache-redis mark-missing user:444 user:555 --ttl 600

    # Remove keys
    rache-redis del user:1 user:444

    # Run the sample flow against a throwaway in-process store
    rache-redis --backend memory demo

    # Use a different server for one invocation
    rache-redis --url redis://:secret@10.0.0.5:6379/2 status

For more information about configuration options, see the documentation.
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute (defaults to `status`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    ///
    /// Example: --config /etc/rache-redis/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    ///
    /// Available values: development (dev), test, staging (stage), production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Switches the log level to debug once logging is up, which includes
    /// the write path chosen for every batch. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Switches the log level to error. Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Store backend override
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Redis URL override, credentials included
    ///
    /// Example: --url redis://:password@127.0.0.1:6379/0
    #[arg(short, long, value_name = "URL", value_parser = super::validation::validate_redis_url)]
    pub url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the sample flow
    ///
    /// Writes a user record under several lookup keys, marks other lookups as
    /// never existing (one by one and in a batch), reads everything back and
    /// prints the state of each key. All demo keys are removed at the end.
    Demo {
        /// TTL in seconds for the negative markers and attachments
        #[arg(long, default_value_t = 3600, allow_negative_numbers = true)]
        ttl: i64,
    },

    /// Read one or more keys
    ///
    /// Examples:
    ///   rache-redis get user:1
    ///   rache-redis get user:1 user:2 user:3
    Get {
        /// Keys to read
        #[arg(required = true, value_parser = super::validation::validate_key)]
        keys: Vec<String>,
    },

    /// Write a value
    ///
    /// A TTL of zero or less stores the value without expiry.
    Set {
        /// Key to write
        #[arg(value_parser = super::validation::validate_key)]
        key: String,

        /// Value to store (must not be empty)
        #[arg(value_parser = super::validation::validate_value)]
        value: String,

        /// Expiry in seconds
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        ttl: i64,
    },

    /// Mark keys as never existing
    ///
    /// Stores the negative marker so later reads report the keys as
    /// confirmed missing instead of unknown.
    MarkMissing {
        /// Keys to mark
        #[arg(required = true, value_parser = super::validation::validate_key)]
        keys: Vec<String>,

        /// Expiry in seconds
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        ttl: i64,
    },

    /// Remove keys
    Del {
        /// Keys to remove
        #[arg(required = true, value_parser = super::validation::validate_key)]
        keys: Vec<String>,
    },

    /// Show backend and connection status
    Status,
}

/// Backend options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    #[value(name = "redis")]
    Redis,
    #[value(name = "memory", alias = "mem")]
    Memory,
}

impl Cli {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        if self.url.is_some() && self.backend == Some(Backend::Memory) {
            return Err("--url has no effect with --backend memory".to_string());
        }

        Ok(())
    }

    /// Log level forced by `--verbose` or `--quiet`
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// The command to run, `status` when none was given
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Status)
    }
}

impl From<Backend> for CacheBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Redis => CacheBackend::Redis,
            Backend::Memory => CacheBackend::Memory,
        }
    }
}
