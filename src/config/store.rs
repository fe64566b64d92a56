//! Cache store configuration module.
//!
//! This module selects the cache backend that holds filter bit vectors.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Cache backend holding the filter bit vectors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process bit-addressable store
    #[default]
    Memory,
    /// In-process key-value cache (not bit-addressable)
    Kv,
    /// Redis server
    Redis,
}

/// Cache store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to use
    pub backend: StoreBackend,

    /// Connection URL for the redis backend
    pub redis_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            redis_url: "redis://127.0.0.1:6379/".to_string(),
        }
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.backend == StoreBackend::Redis {
            if self.redis_url.trim().is_empty() {
                return Err(ConfigError::MissingValue("store.redis_url".to_string()));
            }

            if !self.redis_url.contains("://") {
                return Err(ConfigError::ValidationError(format!(
                    "redis_url must be a URL such as redis://host:port/, got {}",
                    self.redis_url
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_memory() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_redis_url_checked_only_for_redis() {
        let mut config = StoreConfig {
            backend: StoreBackend::Memory,
            redis_url: String::new(),
        };
        assert!(config.validate().is_ok());

        config.backend = StoreBackend::Redis;
        assert!(matches!(config.validate(), Err(ConfigError::MissingValue(_))));

        config.redis_url = "localhost:6379".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.redis_url = "redis://localhost:6379/0".to_string();
        assert!(config.validate().is_ok());
    }
}
