use thiserror::Error;

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::logger::LoggerError;

/// Application-wide error type for the binary and command handlers.
///
/// Library modules keep their own error enums; this type collects them at
/// the command boundary so handlers can use `?` on any of them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Cache store or driver failure
    #[error("Cache operation failed: {operation}")]
    Cache {
        operation: String,
        #[source]
        source: CacheError,
    },

    /// Configuration loading or validation failure
    #[error("Configuration error")]
    Configuration {
        #[from]
        source: ConfigError,
    },

    /// Logger setup failure
    #[error("Logger error")]
    Logger {
        #[from]
        source: LoggerError,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a cache error with the operation that produced it.
    pub fn cache(operation: impl Into<String>, source: CacheError) -> Self {
        AppError::Cache {
            operation: operation.into(),
            source,
        }
    }
}

impl From<CacheError> for AppError {
    fn from(error: CacheError) -> Self {
        AppError::cache("cache operation", error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
