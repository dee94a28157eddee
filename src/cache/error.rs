//! Cache error types.

use redis::RedisError;
use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// Store errors are passed through unchanged; the driver never retries or
/// reinterprets them.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(#[from] RedisError),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Pipeline of {queued} commands failed: {source}")]
    Pipeline {
        queued: usize,
        #[source]
        source: RedisError,
    },

    #[error("Cache connection is closed")]
    Closed,
}

impl CacheError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Whether the error means the connection itself is unusable, as opposed
    /// to a single command being rejected by the server.
    pub fn is_connection_failure(&self) -> bool {
        match self {
            Self::Operation(e) | Self::Pipeline { source: e, .. } => is_transport_error(e),
            Self::Connection(_) | Self::Closed => true,
        }
    }
}

pub(crate) fn is_transport_error(e: &RedisError) -> bool {
    e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
}
