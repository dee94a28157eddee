//! Key/value store primitives consumed by the driver.

use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;

use crate::cache::{CacheError, WriteBatch};

/// Connection state reported by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionStatus {
    Connecting = 0,
    Normal = 1,
    Disconnected = 2,
    Closed = 3,
}

impl ConnectionStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Normal,
            2 => Self::Disconnected,
            _ => Self::Closed,
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Normal => "normal",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Lock-free status cell shared by the store implementations.
///
/// `Closed` is terminal: once set, no other transition is accepted.
#[derive(Debug)]
pub(crate) struct StatusCell(AtomicU8);

impl StatusCell {
    pub(crate) fn new(status: ConnectionStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub(crate) fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Store `next` and return the previous status.
    pub(crate) fn transition(&self, next: ConnectionStatus) -> ConnectionStatus {
        let closed = ConnectionStatus::Closed as u8;
        let prev = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (cur != closed).then_some(next as u8)
            })
            .unwrap_or(closed);
        ConnectionStatus::from_u8(prev)
    }
}

/// The primitives a backing store exposes.
///
/// Implementations must be safe for concurrent use by many in-flight calls.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `GET key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// `MGET keys...`. The reply is positional: one slot per input key.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, CacheError>;

    /// `SET key value` without expiry.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// `SETEX key seconds value`.
    async fn set_with_expiry(&self, key: &str, value: Vec<u8>, seconds: u64)
    -> Result<(), CacheError>;

    /// `MSET k1 v1 k2 v2 ...` without expiry.
    async fn multi_set(&self, items: Vec<(String, Vec<u8>)>) -> Result<(), CacheError>;

    /// `DEL keys...`, returning how many keys existed.
    async fn delete(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// Send every intent of `batch` in one pipelined round trip and wait for
    /// all of them.
    async fn submit(&self, batch: WriteBatch) -> Result<(), CacheError>;

    /// Current connection status. Must not touch the network.
    fn status(&self) -> ConnectionStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let cell = StatusCell::new(ConnectionStatus::Connecting);
        assert_eq!(cell.transition(ConnectionStatus::Normal), ConnectionStatus::Connecting);
        assert_eq!(cell.get(), ConnectionStatus::Normal);
        assert_eq!(
            cell.transition(ConnectionStatus::Disconnected),
            ConnectionStatus::Normal
        );
        assert_eq!(cell.get(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_closed_is_terminal() {
        let cell = StatusCell::new(ConnectionStatus::Normal);
        cell.transition(ConnectionStatus::Closed);
        assert_eq!(cell.transition(ConnectionStatus::Normal), ConnectionStatus::Closed);
        assert_eq!(cell.get(), ConnectionStatus::Closed);
    }
}
