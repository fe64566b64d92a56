// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Error types for the cache-backed Bloom filter.

use crate::store::StoreError;

/// Errors that can occur in Bloom filter construction and operations.
#[derive(Debug, thiserror::Error)]
pub enum BloomFilterError {
    /// The cache store cannot address individual bits
    #[error("Cache store `{backend}` is not bit-addressable")]
    IncompatibleStorageBackend {
        /// Name of the rejected backend
        backend: String,
    },

    /// The hash algorithm name is not one of crc32, md5 or sha1
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The filter has an invalid configuration
    #[error("Invalid filter configuration: {0}")]
    InvalidConfiguration(String),

    /// The cache store failed; passed through unchanged
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl BloomFilterError {
    /// Whether this error came from the cache store.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Whether this error is a construction-time misconfiguration.
    pub fn is_configuration(&self) -> bool {
        !self.is_storage()
    }
}

/// Result type for Bloom filter operations
pub type Result<T> = std::result::Result<T, BloomFilterError>;
