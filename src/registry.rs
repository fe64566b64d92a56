// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Named filter presets.
//!
//! Applications refer to filters by a logical name such as `users_email`.
//! The registry maps each name to its [`FilterConfig`], collected from the
//! `[filters.<name>]` tables of the application configuration and from a
//! presets directory of `<name>.toml` files written by the `make` command.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::bloom::{BloomFilter, BloomFilterError, FilterConfig};
use crate::config::AppConfig;
use crate::store::CacheStore;

/// Errors raised while registering or resolving named filters.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No filter is registered under the name
    #[error("No filter registered under the name `{0}`")]
    UnknownFilter(String),

    /// Two definitions share a name
    #[error("Filter `{0}` is defined more than once")]
    DuplicateFilter(String),

    /// A definition does not validate
    #[error("Invalid definition for filter `{name}`: {source}")]
    InvalidDefinition {
        /// Filter name
        name: String,
        /// Validation failure
        #[source]
        source: BloomFilterError,
    },

    /// A preset file could not be read or parsed
    #[error("Failed to load preset {path:?}: {message}")]
    PresetLoad {
        /// Preset file
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Opening the filter failed
    #[error(transparent)]
    Filter(#[from] BloomFilterError),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Mapping from logical filter names to their configuration.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterConfig>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from the application configuration and its presets
    /// directory.
    pub fn from_app_config(config: &AppConfig) -> RegistryResult<Self> {
        let mut registry = Self::new();
        for (name, filter) in &config.filters {
            registry.register(name, filter.clone())?;
        }

        registry.load_presets_dir(config.presets_dir_or_default())?;

        Ok(registry)
    }

    /// Register `config` under `name`.
    ///
    /// Names are case-insensitive. An empty key defaults to the name as
    /// given. The configuration is validated before it is accepted.
    pub fn register(&mut self, name: &str, config: FilterConfig) -> RegistryResult<()> {
        let lookup = normalize(name);
        if self.filters.contains_key(&lookup) {
            return Err(RegistryError::DuplicateFilter(name.to_string()));
        }

        let config = config.named(name);
        config
            .validate()
            .map_err(|source| RegistryError::InvalidDefinition {
                name: name.to_string(),
                source,
            })?;

        tracing::debug!(name, key = config.key(), "Registered filter");
        self.filters.insert(lookup, config);
        Ok(())
    }

    /// Register every `*.toml` preset in `dir`, named by file stem.
    ///
    /// Returns how many presets were loaded. A missing directory loads none.
    pub fn load_presets_dir(&mut self, dir: &Path) -> RegistryResult<usize> {
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "Presets directory does not exist");
            return Ok(0);
        }

        let entries = fs::read_dir(dir).map_err(|e| RegistryError::PresetLoad {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| RegistryError::PresetLoad {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                })?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_preset(path)?;
        }

        tracing::info!(dir = %dir.display(), count = paths.len(), "Loaded filter presets");
        Ok(paths.len())
    }

    /// Register a single preset file, named by its file stem.
    pub fn load_preset(&mut self, path: &Path) -> RegistryResult<()> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| RegistryError::PresetLoad {
                path: path.to_path_buf(),
                message: "file name is not valid UTF-8".to_string(),
            })?
            .to_string();

        let contents = fs::read_to_string(path).map_err(|e| RegistryError::PresetLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: FilterConfig =
            toml::from_str(&contents).map_err(|e| RegistryError::PresetLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        self.register(&name, config)
    }

    /// Configuration registered under `name`.
    pub fn resolve(&self, name: &str) -> RegistryResult<&FilterConfig> {
        self.filters
            .get(&normalize(name))
            .ok_or_else(|| RegistryError::UnknownFilter(name.to_string()))
    }

    /// Open the filter registered under `name` on `store`.
    pub fn open<S>(&self, name: &str, store: Arc<S>) -> RegistryResult<BloomFilter>
    where
        S: CacheStore + ?Sized,
    {
        let config = self.resolve(name)?.clone();
        Ok(BloomFilter::new(config, store)?)
    }

    /// Registered names in lowercase, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filters are registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Lookup form of a filter name.
///
/// Configuration tables arrive with lowercased keys while preset file stems
/// keep their case, so names are compared in lowercase.
fn normalize(name: &str) -> String {
    name.to_lowercase()
}
