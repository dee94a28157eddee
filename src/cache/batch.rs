//! Write batches submitted to a store as one pipeline.

/// One queued `SETEX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteIntent {
    pub key: String,
    pub value: Vec<u8>,
    pub expiry_seconds: u64,
}

/// An ordered list of expiring writes.
///
/// The batch is built completely before the store sees any of it, and the
/// store executes it in one round trip. It succeeds or fails as a unit from
/// the caller's point of view; the store gives no cross-key atomicity, so a
/// failure part way through may leave some keys written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    intents: Vec<WriteIntent>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            intents: Vec::with_capacity(capacity),
        }
    }

    /// Queue a write that expires after `expiry_seconds`.
    pub fn set_with_expiry(
        &mut self,
        key: impl Into<String>,
        value: Vec<u8>,
        expiry_seconds: u64,
    ) -> &mut Self {
        self.intents.push(WriteIntent {
            key: key.into(),
            value,
            expiry_seconds,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn intents(&self) -> &[WriteIntent] {
        &self.intents
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteIntent;
    type IntoIter = std::vec::IntoIter<WriteIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}
