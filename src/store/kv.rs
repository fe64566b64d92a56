// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Plain key-value cache without bit addressing.

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::CacheStore;

/// An in-process cache of opaque byte values.
///
/// It behaves like any general-purpose cache (get, put, forget) but cannot
/// address individual bits, so it never offers a [`super::BitStore`] view and
/// Bloom filters refuse to run on it.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.entries.write().insert(key.into(), value.into())
    }

    /// Remove `key`, reporting whether it was present.
    pub fn forget(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Remove every entry.
    pub fn flush(&self) {
        self.entries.write().clear();
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryKeyValueStore {
    fn name(&self) -> &str {
        "kv"
    }
}
