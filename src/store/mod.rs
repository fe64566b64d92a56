// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Cache store abstractions backing the Bloom filters.
//!
//! A Bloom filter never keeps bits locally. Every bit lives in a keyed bit
//! vector owned by a cache store, and the filter reaches it through exactly
//! three primitives: set a bit, read a bit, delete the whole vector.
//!
//! Not every cache store can address individual bits. [`CacheStore`] describes
//! any cache backend; [`CacheStore::bit_store`] is the capability probe that
//! hands out the [`BitStore`] view when the backend supports it.
//!
//! # Backends
//!
//! - [`MemoryBitStore`]: in-process, bit-addressable, Redis-compatible bit order.
//! - [`MemoryKeyValueStore`]: in-process byte-value cache without bit operations.
//! - `RedisBitStore`: `SETBIT`/`GETBIT`/`DEL` against Redis (feature `redis`).

use std::fmt;
use std::sync::Arc;

use crate::config::store::{StoreBackend, StoreConfig};

mod kv;
mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use kv::MemoryKeyValueStore;
pub use memory::MemoryBitStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisBitStore;

/// Highest bit offset a store must accept (`2^32 - 1`, the Redis limit).
pub const MAX_BIT_OFFSET: u64 = u32::MAX as u64;

/// Errors raised by cache store backends.
///
/// These are passed through the filter untouched so callers can tell a
/// failing backend apart from a misconfigured filter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// A bit offset beyond what the backend can address
    #[error("Bit offset {index} for key `{key}` exceeds the maximum of 4294967295")]
    OffsetOutOfRange {
        /// Key of the bit vector
        key: String,
        /// Offending bit offset
        index: u64,
    },

    /// Error reported by the Redis client
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// Result type for cache store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A keyed, bit-addressable vector store.
///
/// Each call is expected to be atomic for the single bit it touches. Nothing
/// is promised across calls.
#[cfg_attr(test, mockall::automock)]
pub trait BitStore: Send + Sync {
    /// Set the bit at `index` of the vector stored under `key`.
    ///
    /// Missing vectors are created and grown as needed.
    fn set_bit(&self, key: &str, index: u64, value: bool) -> StoreResult<()>;

    /// Read the bit at `index` of the vector stored under `key`.
    ///
    /// Missing vectors and offsets past the end read as `false`.
    fn get_bit(&self, key: &str, index: u64) -> StoreResult<bool>;

    /// Delete the whole vector stored under `key`.
    fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Any cache backend a filter may be handed.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Capability probe: the bit-addressable view of this store, if it has one.
    fn bit_store(self: Arc<Self>) -> Option<Arc<dyn BitStore>> {
        None
    }
}

/// Build the cache store selected by the configuration.
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryBitStore::new()),
        StoreBackend::Kv => Arc::new(MemoryKeyValueStore::new()),
        #[cfg(feature = "redis")]
        StoreBackend::Redis => Arc::new(RedisBitStore::open(&config.redis_url)?),
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => {
            return Err(StoreError::Unavailable(
                "redis backend requires building with the `redis` feature".to_string(),
            ))
        }
    };

    tracing::debug!(backend = store.name(), "Opened cache store");
    Ok(store)
}

/// Locate the byte and mask for a bit offset, most significant bit first.
pub(crate) fn bit_position(index: u64) -> (usize, u8) {
    let byte = (index / 8) as usize;
    let mask = 0x80u8 >> (index % 8);
    (byte, mask)
}
