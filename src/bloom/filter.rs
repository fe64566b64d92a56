// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Main implementation of the cache-backed Bloom filter.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::bloom::config::{estimated_false_positive_rate, FilterConfig};
use crate::bloom::error::{BloomFilterError, Result};
use crate::bloom::hash::HashIndexer;
use crate::store::{BitStore, CacheStore};

/// A Bloom filter whose bits live in a shared cache store.
///
/// The filter itself only holds its configuration and a handle to the store.
/// Every `add`, `contains` and `clear` goes straight to the store, so any
/// number of filters, in any number of processes, that use the same key see
/// the same set.
///
/// No atomicity is provided across the `hash_count` bit operations of one
/// call. A concurrent `contains` may observe an `add` halfway through and
/// report `false` for the value being added; it can never report a false
/// positive because of it. Store failures are returned as-is and leave any
/// bits already written in place.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cachebloom_lib::bloom::{BloomFilter, FilterConfig, HashAlgorithm};
/// use cachebloom_lib::store::MemoryBitStore;
///
/// let store = Arc::new(MemoryBitStore::new());
/// let config = FilterConfig::new("t1")
///     .with_size(1_000)
///     .with_hash_count(3)
///     .with_algorithm(HashAlgorithm::Md5);
/// let filter = BloomFilter::new(config, store).unwrap();
///
/// filter.add("alice@example.com").unwrap();
/// assert!(filter.contains("alice@example.com").unwrap());
/// assert!(!filter.contains("bob@example.com").unwrap());
///
/// filter.clear().unwrap();
/// assert!(!filter.contains("alice@example.com").unwrap());
/// ```
#[derive(Clone)]
pub struct BloomFilter {
    config: FilterConfig,
    indexer: HashIndexer,
    store: Arc<dyn BitStore>,
}

impl BloomFilter {
    /// Create a filter on a cache store, checking that it is bit-addressable.
    ///
    /// # Errors
    ///
    /// `IncompatibleStorageBackend` when the store cannot address bits, and
    /// `InvalidConfiguration` when the configuration does not validate.
    /// Nothing is sent to the store.
    pub fn new<S>(config: FilterConfig, store: Arc<S>) -> Result<Self>
    where
        S: CacheStore + ?Sized,
    {
        let backend = store.name().to_string();
        let Some(bits) = store.bit_store() else {
            warn!(key = config.key(), %backend, "Rejecting cache store without bit operations");
            return Err(BloomFilterError::IncompatibleStorageBackend { backend });
        };

        Self::with_bit_store(config, bits)
    }

    /// Create a filter directly on a bit store.
    pub fn with_bit_store(config: FilterConfig, store: Arc<dyn BitStore>) -> Result<Self> {
        if let Err(e) = config.validate() {
            warn!(key = config.key(), error = %e, "Rejecting filter configuration");
            return Err(e);
        }

        let indexer = HashIndexer::from_config(&config)?;
        info!(
            key = config.key(),
            size = config.size(),
            hash_count = config.hash_count(),
            algorithm = %config.algorithm(),
            "Bloom filter ready"
        );

        Ok(Self {
            config,
            indexer,
            store,
        })
    }

    /// Add `value` to the set by setting each of its bits.
    pub fn add(&self, value: &str) -> Result<()> {
        let key = self.config.key();
        for index in self.indexer.indices(value) {
            self.store.set_bit(key, index, true)?;
        }

        debug!(key, hash_count = self.indexer.hash_count(), "Added value");
        Ok(())
    }

    /// Returns true if the set might contain `value`.
    ///
    /// False positives are possible, but false negatives are not. Bits are
    /// read in round order and the first unset bit answers `false`.
    pub fn contains(&self, value: &str) -> Result<bool> {
        let key = self.config.key();
        for (round, index) in self.indexer.indices(value).enumerate() {
            if !self.store.get_bit(key, index)? {
                trace!(key, round, index, "Unset bit, value absent");
                return Ok(false);
            }
        }

        debug!(key, "All bits set, value probably present");
        Ok(true)
    }

    /// Discard the whole bit vector.
    ///
    /// This empties the set for every filter sharing the key.
    pub fn clear(&self) -> Result<()> {
        self.store.delete(self.config.key())?;
        debug!(key = self.config.key(), "Cleared filter");
        Ok(())
    }

    /// Bit indices `value` maps to, in round order.
    pub fn indices(&self, value: &str) -> Vec<u64> {
        self.indexer.compute(value)
    }

    /// Expected false positive rate after `inserted_items` distinct additions.
    pub fn estimated_false_positive_rate(&self, inserted_items: u64) -> f64 {
        estimated_false_positive_rate(self.config.hash_count(), inserted_items, self.config.size())
    }

    /// Get the configuration of this filter.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Key of the bit vector in the store.
    pub fn key(&self) -> &str {
        self.config.key()
    }
}

impl fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BloomFilter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
