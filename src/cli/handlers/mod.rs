//! Command handlers for CLI operations
//!
//! This module contains handlers for different CLI commands,
//! separating command execution logic from parsing and validation.

pub mod demo;
pub mod ops;

pub use demo::DemoCommandHandler;
pub use ops::KeyCommandHandler;

use crate::cache::CacheValue;

/// Render a tri-state value for terminal output.
pub fn render_value(value: &CacheValue) -> String {
    match value {
        CacheValue::Unknown => "(unknown)".to_string(),
        CacheValue::NegativeMarker => "(never exists)".to_string(),
        CacheValue::Payload(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
