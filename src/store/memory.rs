// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! In-process bit-addressable store.

use std::sync::Arc;

use dashmap::DashMap;

use super::{bit_position, BitStore, CacheStore, StoreError, StoreResult, MAX_BIT_OFFSET};

/// A bit-addressable cache store held in process memory.
///
/// Vectors are byte strings laid out exactly like Redis strings touched by
/// `SETBIT`: bit 0 is the most significant bit of byte 0 and the vector grows
/// to cover the highest offset ever set. Each key is guarded by its own shard
/// lock, which makes every single-bit operation atomic.
///
/// # Examples
///
/// ```
/// use cachebloom_lib::store::{BitStore, MemoryBitStore};
///
/// let store = MemoryBitStore::new();
/// store.set_bit("visitors", 9, true).unwrap();
///
/// assert!(store.get_bit("visitors", 9).unwrap());
/// assert!(!store.get_bit("visitors", 10).unwrap());
/// assert_eq!(store.snapshot("visitors"), Some(vec![0b0000_0000, 0b0100_0000]));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBitStore {
    vectors: DashMap<String, Vec<u8>>,
}

impl MemoryBitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the raw bytes stored under `key`.
    pub fn snapshot(&self, key: &str) -> Option<Vec<u8>> {
        self.vectors.get(key).map(|bytes| bytes.value().clone())
    }

    /// Number of set bits stored under `key`.
    pub fn count_ones(&self, key: &str) -> u64 {
        self.vectors
            .get(key)
            .map(|bytes| bytes.value().iter().map(|b| u64::from(b.count_ones())).sum())
            .unwrap_or(0)
    }

    /// Whether a vector exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.vectors.contains_key(key)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl BitStore for MemoryBitStore {
    fn set_bit(&self, key: &str, index: u64, value: bool) -> StoreResult<()> {
        if index > MAX_BIT_OFFSET {
            return Err(StoreError::OffsetOutOfRange {
                key: key.to_string(),
                index,
            });
        }

        let (byte, mask) = bit_position(index);
        let mut entry = self.vectors.entry(key.to_string()).or_default();
        let bytes = entry.value_mut();
        if bytes.len() <= byte {
            bytes.resize(byte + 1, 0);
        }

        if value {
            bytes[byte] |= mask;
        } else {
            bytes[byte] &= !mask;
        }

        Ok(())
    }

    fn get_bit(&self, key: &str, index: u64) -> StoreResult<bool> {
        if index > MAX_BIT_OFFSET {
            return Err(StoreError::OffsetOutOfRange {
                key: key.to_string(),
                index,
            });
        }

        let (byte, mask) = bit_position(index);
        let set = self
            .vectors
            .get(key)
            .and_then(|bytes| bytes.value().get(byte).map(|b| b & mask != 0))
            .unwrap_or(false);

        Ok(set)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.vectors.remove(key);
        Ok(())
    }
}

impl CacheStore for MemoryBitStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn bit_store(self: Arc<Self>) -> Option<Arc<dyn BitStore>> {
        Some(self)
    }
}
