//! Builds [`Settings`] from TOML files and `RACHE_*` variables.

use std::path::PathBuf;

use config::{Config, File, FileFormat, Map};

use crate::config::environment::Environment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const VAR_PREFIX: &str = "RACHE";
const CONFIG_DIR_VAR: &str = "RACHE_CONFIG_DIR";
const CONFIG_FILE_VAR: &str = "RACHE_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "config";

/// Where the file part of the settings comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `default.toml` (required), then `{environment}.toml` and `local.toml`
    /// from this directory, each overriding the one before.
    Layered(PathBuf),
    /// A single required file.
    File(PathBuf),
}

/// Settings loader.
///
/// `RACHE_*` variables are applied over the files, with `__` separating
/// nested keys: `RACHE_CACHE__REDIS__URL` sets `cache.redis.url`.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    source: ConfigSource,
    environment: Environment,
    vars: Map<String, String>,
}

impl ConfigLoader {
    /// Loader configured from the process environment.
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Loader configured from `vars` instead of the process environment.
    ///
    /// `RACHE_CONFIG_DIR` and `RACHE_CONFIG_FILE` are mutually exclusive;
    /// `RACHE_APP_ENV` picks the environment overlay.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars: Map<String, String> = vars
            .into_iter()
            .filter(|(k, _)| k.starts_with(VAR_PREFIX))
            .collect();

        let source = match (vars.get(CONFIG_DIR_VAR), vars.get(CONFIG_FILE_VAR)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::mutual_exclusivity(format!(
                    "set either {CONFIG_DIR_VAR} or {CONFIG_FILE_VAR}, not both"
                )));
            }
            (_, Some(file)) => ConfigSource::File(PathBuf::from(file)),
            (dir, None) => ConfigSource::Layered(PathBuf::from(
                dir.map_or(DEFAULT_CONFIG_DIR, String::as_str),
            )),
        };

        let environment = match vars.get(Environment::VAR) {
            Some(name) => name.parse()?,
            None => Environment::default(),
        };

        Ok(Self {
            source,
            environment,
            vars,
        })
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = ConfigSource::File(path.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Merge all sources, deserialize and validate.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        for (path, required) in self.files() {
            if required && !path.is_file() {
                return Err(ConfigError::file_not_found(path.display().to_string()));
            }
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(VAR_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .source(Some(self.vars.clone())),
            )
            .build()?
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Files in merge order, each paired with whether it must exist.
    fn files(&self) -> Vec<(PathBuf, bool)> {
        match &self.source {
            ConfigSource::File(path) => vec![(path.clone(), true)],
            ConfigSource::Layered(dir) => vec![
                (dir.join("default.toml"), true),
                (dir.join(format!("{}.toml", self.environment)), false),
                (dir.join("local.toml"), false),
            ],
        }
    }
}
