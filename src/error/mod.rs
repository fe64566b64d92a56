//! Error module for cachebloom.
//!
//! Each component owns its error type; [`AppError`] gathers them for the
//! binary and for callers that drive the whole stack (configuration, registry,
//! cache store and filters) through one result type.

use thiserror::Error;

use crate::bloom::BloomFilterError;
use crate::registry::RegistryError;
use crate::scaffold::ScaffoldError;
use crate::store::StoreError;

pub mod config;

/// Result type alias used by the application layer.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error enum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Filter construction or operation failures.
    #[error("Filter error: {0}")]
    Filter(#[from] BloomFilterError),

    /// Filter name resolution failures.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Preset generation failures.
    #[error("Scaffold error: {0}")]
    Scaffold(#[from] ScaffoldError),

    /// Cache store failures outside of a filter operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// IO errors that may occur during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Custom error with message for cases where specific error types are not defined.
    #[error("{0}")]
    Custom(String),
}

impl AppError {
    /// Whether the failure came from the cache store rather than from
    /// configuration or caller input.
    pub fn is_storage(&self) -> bool {
        match self {
            Self::Store(_) => true,
            Self::Filter(e) => e.is_storage(),
            Self::Registry(RegistryError::Filter(e)) => e.is_storage(),
            _ => false,
        }
    }
}
