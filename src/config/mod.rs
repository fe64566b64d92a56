//! Configuration module for cachebloom.
//!
//! This module provides the configuration system that loads settings from
//! files (TOML, YAML, JSON) and overrides them with environment variables.
//! Named filter definitions live here too, next to the cache store selection.
//! All configuration values are validated for correctness before use.

use crate::bloom::FilterConfig;
use crate::error::config::ConfigError;
use config::{Config, ConfigError as ExternalConfigError, Environment, File, FileFormat};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod store;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default configuration location
pub const DEFAULT_CONFIG_PATH: &str = "config/cachebloom.toml";

/// Presets directory used when none is configured
pub const DEFAULT_PRESETS_DIR: &str = "filters";

/// Default environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CACHEBLOOM";

/// A trait for types that can be validated.
pub trait Validate {
    /// Validates that the configuration is correct.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is valid
    /// * `Err(ConfigError)` if the configuration is invalid
    fn validate(&self) -> ConfigResult<()>;
}

/// Main configuration for cachebloom.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Directory of `<name>.toml` filter presets; see [`AppConfig::presets_dir_or_default`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets_dir: Option<PathBuf>,

    /// Log configuration
    pub log: LogConfig,

    /// Cache store configuration
    pub store: store::StoreConfig,

    /// Named filters; an empty key defaults to the filter name
    #[serde(default)]
    pub filters: HashMap<String, FilterConfig>,
}

impl AppConfig {
    /// Directory holding `<name>.toml` presets, falling back to
    /// [`DEFAULT_PRESETS_DIR`].
    ///
    /// Both preset generation and the registry read it from here.
    pub fn presets_dir_or_default(&self) -> &Path {
        self.presets_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_PRESETS_DIR))
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.log.validate()?;
        self.store.validate()?;

        for (name, filter) in &self.filters {
            filter
                .clone()
                .named(name)
                .validate()
                .map_err(|e| ConfigError::ValidationError(format!("filter `{name}`: {e}")))?;
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to log in JSON format
    pub json: bool,

    /// Whether to include source code locations in logs
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            source_location: false,
        }
    }
}

impl Validate for LogConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}",
                self.level
            ))),
        }
    }
}

/// Configuration loader for cachebloom.
#[derive(Debug)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to the configuration file
    /// * `env_prefix` - Prefix for environment variables that override configuration values
    pub fn new<P: AsRef<Path>>(config_path: Option<P>, env_prefix: &str) -> Self {
        Self {
            config_path: config_path.map(|p| p.as_ref().to_path_buf()),
            env_prefix: env_prefix.to_string(),
        }
    }

    /// Loads the configuration from defaults, a file and environment variables.
    ///
    /// # Returns
    ///
    /// * `Ok(AppConfig)` if the configuration was loaded successfully
    /// * `Err(ConfigError)` if there was an error loading the configuration
    pub fn load(&self) -> ConfigResult<AppConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&AppConfig::default())
                .map_err(|e| ConfigError::ParseError(e.to_string()))?,
        );

        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }

            let format = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => FileFormat::Toml,
                Some("json") => FileFormat::Json,
                Some("yaml" | "yml") => FileFormat::Yaml,
                _ => {
                    return Err(ConfigError::ParseError(format!(
                        "Unsupported file extension for: {path:?}"
                    )))
                }
            };
            builder = builder.add_source(File::from(path.as_path()).format(format));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(|e| match e {
            ExternalConfigError::NotFound(path) => ConfigError::FileNotFound(PathBuf::from(path)),
            ExternalConfigError::FileParse { uri, cause } => ConfigError::ParseError(format!(
                "{}: {cause}",
                uri.unwrap_or_else(|| "<unknown>".to_string())
            )),
            other => ConfigError::ParseError(other.to_string()),
        })?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        app_config.validate()?;

        tracing::debug!(
            filters = app_config.filters.len(),
            backend = ?app_config.store.backend,
            "Configuration loaded"
        );

        Ok(app_config)
    }
}
