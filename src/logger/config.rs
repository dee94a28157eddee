//! Logger settings, read from the `[logger]` table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::logger::error::LoggerError;

const LEVELS: [Level; 5] = [
    Level::TRACE,
    Level::DEBUG,
    Level::INFO,
    Level::WARN,
    Level::ERROR,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// One of trace, debug, info, warn, error (any case)
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        parse_level(&self.level)?;

        if self.file.enabled && self.file.path.as_os_str().is_empty() {
            return Err(LoggerError::config("file output is enabled without a path"));
        }
        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config("console and file output are both disabled"));
        }

        Ok(())
    }
}

pub(crate) fn parse_level(level: &str) -> Result<Level, LoggerError> {
    LEVELS
        .into_iter()
        .find(|l| l.as_str().eq_ignore_ascii_case(level))
        .ok_or_else(|| {
            LoggerError::config(format!(
                "unknown log level '{level}', expected trace, debug, info, warn or error"
            ))
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colors, only applied when stdout is a terminal
    pub colored: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Truncate the file on startup when false
    pub append: bool,
    pub format: LogFormat,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/rache-redis.log"),
            append: true,
            format: LogFormat::Json,
        }
    }
}

/// Line format of the log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}
