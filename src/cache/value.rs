//! Tri-state cache values and their byte encoding.
//!
//! The store only knows "key present with bytes" and "key absent". The three
//! states the orchestration layer needs are recovered with a length check:
//!
//! | store reply        | value            |
//! |--------------------|------------------|
//! | absent             | `Unknown`        |
//! | present, 0 bytes   | `NegativeMarker` |
//! | present, n>0 bytes | `Payload(bytes)` |
//!
//! Zero-length values are reserved for the negative marker. A caller that
//! stores a genuinely empty payload reads it back as `NegativeMarker`.

/// A value read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheValue {
    /// The key was never written, was removed, or has expired.
    Unknown,
    /// The key is confirmed to have no underlying data.
    NegativeMarker,
    /// The key holds serialized data.
    Payload(Vec<u8>),
}

impl CacheValue {
    /// Decode a raw store reply.
    pub fn decode(raw: Option<Vec<u8>>) -> Self {
        match raw {
            None => Self::Unknown,
            Some(bytes) if bytes.is_empty() => Self::NegativeMarker,
            Some(bytes) => Self::Payload(bytes),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::NegativeMarker)
    }

    /// Borrow the payload bytes, if any.
    pub fn as_payload(&self) -> Option<&[u8]> {
        match self {
            Self::Payload(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self {
            Self::Payload(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn state(&self) -> EntryState {
        EntryState::from(self)
    }
}

impl From<CacheBody> for CacheValue {
    fn from(body: CacheBody) -> Self {
        match body {
            CacheBody::NegativeMarker => Self::NegativeMarker,
            CacheBody::Payload(bytes) => Self::Payload(bytes),
        }
    }
}

/// A value that can be written. `Unknown` has no representation other than
/// the absence of the key, so it cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheBody {
    NegativeMarker,
    Payload(Vec<u8>),
}

impl CacheBody {
    /// Wrap serialized data. Empty input is not rejected; it will read back
    /// as `NegativeMarker`.
    pub fn payload(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Payload(bytes.into())
    }

    /// The bytes written to the store for this body.
    pub fn encode(&self) -> &[u8] {
        match self {
            Self::NegativeMarker => &[],
            Self::Payload(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::NegativeMarker => Vec::new(),
            Self::Payload(bytes) => bytes,
        }
    }
}

/// Existence answer for a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    Absent,
    Negative,
    Present,
}

impl From<&CacheValue> for EntryState {
    fn from(value: &CacheValue) -> Self {
        match value {
            CacheValue::Unknown => Self::Absent,
            CacheValue::NegativeMarker => Self::Negative,
            CacheValue::Payload(_) => Self::Present,
        }
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryState::Absent => "absent",
            EntryState::Negative => "negative",
            EntryState::Present => "present",
        };
        f.write_str(s)
    }
}

/// Expiry to attach to a write, or `None` when `ttl` asks for no expiry.
pub fn expiry_seconds(ttl: i64) -> Option<u64> {
    u64::try_from(ttl).ok().filter(|&secs| secs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_absent() {
        assert_eq!(CacheValue::decode(None), CacheValue::Unknown);
    }

    #[test]
    fn test_decode_empty_is_negative_marker() {
        assert_eq!(CacheValue::decode(Some(Vec::new())), CacheValue::NegativeMarker);
    }

    #[test]
    fn test_decode_payload() {
        assert_eq!(
            CacheValue::decode(Some(b"alice".to_vec())),
            CacheValue::Payload(b"alice".to_vec())
        );
    }

    #[test]
    fn test_negative_marker_encodes_empty() {
        assert!(CacheBody::NegativeMarker.encode().is_empty());
        assert!(CacheBody::NegativeMarker.into_bytes().is_empty());
    }

    #[test]
    fn test_empty_payload_reads_back_as_negative_marker() {
        let raw = CacheBody::payload(Vec::new()).into_bytes();
        assert_eq!(CacheValue::decode(Some(raw)), CacheValue::NegativeMarker);
    }

    #[test]
    fn test_entry_state() {
        assert_eq!(CacheValue::Unknown.state(), EntryState::Absent);
        assert_eq!(CacheValue::NegativeMarker.state(), EntryState::Negative);
        assert_eq!(CacheValue::Payload(vec![1]).state(), EntryState::Present);
    }

    #[test]
    fn test_expiry_seconds() {
        assert_eq!(expiry_seconds(0), None);
        assert_eq!(expiry_seconds(-5), None);
        assert_eq!(expiry_seconds(30), Some(30));
    }

    proptest! {
        #[test]
        fn prop_non_empty_payload_survives(bytes in proptest::collection::vec(any::<u8>(), 1..256)) {
            let body = CacheBody::payload(bytes.clone());
            let decoded = CacheValue::decode(Some(body.encode().to_vec()));
            prop_assert_eq!(decoded, CacheValue::Payload(bytes));
        }

        #[test]
        fn prop_written_body_reads_back_as_itself(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let body = if bytes.is_empty() {
                CacheBody::NegativeMarker
            } else {
                CacheBody::Payload(bytes)
            };
            let decoded = CacheValue::decode(Some(body.clone().into_bytes()));
            prop_assert_eq!(decoded, CacheValue::from(body));
        }
    }
}
