//! Logger Module
//!
//! A logging setup based on `tracing-subscriber` with:
//! - Console output with color control
//! - Optional file output (Full, Compact, JSON)
//! - Runtime log level changes through [`LogLevelHandle`]

pub mod config;
pub mod error;

pub use config::*;
pub use error::LoggerError;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::sync::Mutex;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::Layered, layer::SubscriberExt, reload,
    util::SubscriberInitExt,
};

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Handle for changing the active log level after initialization.
#[derive(Clone)]
pub struct LogLevelHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogLevelHandle {
    /// Replace the active filter with `level` (trace, debug, info, warn, error).
    pub fn set_level(&self, level: &str) -> Result<(), LoggerError> {
        let filter = level_filter(config::parse_level(level)?);
        self.inner
            .reload(filter)
            .map_err(|e| LoggerError::reload(e.to_string()))
    }
}

fn level_filter(level: tracing::Level) -> EnvFilter {
    EnvFilter::new(level.as_str().to_ascii_lowercase())
}

/// Initialize the global subscriber with the given configuration.
pub fn init_logger(config: LoggerConfig) -> Result<LogLevelHandle, LoggerError> {
    config.validate()?;

    let (filter, handle) = reload::Layer::new(level_filter(config::parse_level(&config.level)?));

    // File layer goes first so console ANSI settings do not leak into it.
    let file_layer = if config.file.enabled {
        Some(file_layer(&config.file)?)
    } else {
        None
    };

    let console_layer = config.console.enabled.then(|| {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        fmt::layer()
            .with_ansi(use_ansi)
            .with_target(true)
            .with_level(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized {
            message: e.to_string(),
        })?;

    Ok(LogLevelHandle { inner: handle })
}

fn file_layer(config: &FileConfig) -> Result<BoxedLayer, LoggerError> {
    if let Some(parent) = config.path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(config.append)
        .truncate(!config.append)
        .open(&config.path)?;
    let writer = Mutex::new(file);

    let layer: BoxedLayer = match config.format {
        LogFormat::Full => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_writer(writer)
            .boxed(),
    };

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_layer_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let config = FileConfig {
            enabled: true,
            path: dir.path().join("nested/out.log"),
            append: false,
            format: LogFormat::Compact,
        };

        assert!(file_layer(&config).is_ok());
        assert!(config.path.exists());
    }

    #[test]
    fn test_set_level_swaps_filter() {
        let (_layer, inner) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        let handle = LogLevelHandle { inner };

        handle.set_level("DEBUG").unwrap();
        let active = handle.inner.with_current(|f| f.to_string()).unwrap();
        assert_eq!(active.to_lowercase(), "debug");

        assert!(matches!(
            handle.set_level("chatty"),
            Err(LoggerError::Config { .. })
        ));
        let active = handle.inner.with_current(|f| f.to_string()).unwrap();
        assert_eq!(active.to_lowercase(), "debug");
    }

    #[test]
    fn test_set_level_after_layer_dropped() {
        let (layer, inner) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("info"));
        drop(layer);
        let handle = LogLevelHandle { inner };
        assert!(matches!(
            handle.set_level("warn"),
            Err(LoggerError::Reload { .. })
        ));
    }

    #[test]
    fn test_init_rejects_invalid_level() {
        let config = LoggerConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_logger(config),
            Err(LoggerError::Config { .. })
        ));
    }
}
