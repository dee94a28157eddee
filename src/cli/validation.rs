//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Validate a cache key. Keys are opaque but must not be empty.
pub fn validate_key(key: &str) -> Result<String, String> {
    if key.is_empty() {
        return Err("Cache key cannot be empty".to_string());
    }
    Ok(key.to_string())
}

/// Validate a value for `set`.
///
/// An empty value would read back as the negative marker, so it is refused
/// here; use `mark-missing` for that.
pub fn validate_value(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("Value cannot be empty; use `mark-missing` to store a negative marker".to_string());
    }
    Ok(value.to_string())
}

/// Validate that a URL uses a scheme the redis client understands
pub fn validate_redis_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    const SCHEMES: &[&str] = &["redis://", "rediss://", "redis+unix://", "unix://"];

    if url.is_empty() {
        return Err("Redis URL cannot be empty".to_string());
    }

    if !SCHEMES.iter().any(|s| url.starts_with(s)) {
        return Err(format!(
            "Invalid Redis URL '{}'. Expected redis://, rediss:// or redis+unix://",
            url
        ));
    }

    Ok(url.to_string())
}
