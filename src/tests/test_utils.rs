//! Test utilities and fixtures for cachebloom.
//!
//! Strategies for property-based tests, a filter factory over the in-memory
//! bit store and a fixture for configuration files and environment variables.

use std::sync::Arc;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use tempfile::TempDir;

use crate::bloom::{BloomFilter, FilterConfig, HashAlgorithm};
use crate::store::MemoryBitStore;

/// Maximum number of values inserted by one property case.
const MAX_VALUES: usize = 32;

/// Strategy for values added to a filter.
///
/// Mixes printable ASCII with arbitrary unicode so both the decimal round
/// suffix and multi-byte input reach the digests.
pub fn value_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        "[a-zA-Z0-9@._+-]{0,40}",
        proptest::collection::vec(proptest::char::any(), 0..16)
            .prop_map(|chars| chars.into_iter().collect::<String>()),
    ]
    .boxed()
}

/// Strategy for a batch of values.
pub fn values_strategy() -> BoxedStrategy<Vec<String>> {
    proptest::collection::vec(value_strategy(), 1..MAX_VALUES).boxed()
}

/// Strategy for valid filter configurations over every algorithm.
pub fn config_strategy() -> BoxedStrategy<FilterConfig> {
    (
        100u64..=100_000,
        1u32..=10,
        proptest::sample::select(HashAlgorithm::ALL.to_vec()),
    )
        .prop_map(|(size, hash_count, algorithm)| {
            FilterConfig::new("prop_filter")
                .with_size(size)
                .with_hash_count(hash_count)
                .with_algorithm(algorithm)
        })
        .boxed()
}

/// Build a filter for `config` on a fresh in-memory store, returning both.
pub fn memory_filter(config: FilterConfig) -> (BloomFilter, Arc<MemoryBitStore>) {
    let store = Arc::new(MemoryBitStore::new());
    let filter = BloomFilter::new(config, Arc::clone(&store)).expect("valid test configuration");
    (filter, store)
}

/// Fixture for tests that read configuration from disk and the environment.
pub struct TestFixture {
    /// Temporary directory for test files
    pub temp_dir: TempDir,
    /// Environment variables to clean up after the test
    env_vars: Vec<String>,
}

impl TestFixture {
    /// Create a new test fixture.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
            env_vars: Vec::new(),
        })
    }

    /// Set an environment variable for this test.
    ///
    /// The variable is removed when the fixture is dropped.
    pub fn set_env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        std::env::set_var(&key, value.into());
        self.env_vars.push(key);
    }

    /// Write `contents` to `name` inside the fixture directory.
    pub fn write_file<C: AsRef<[u8]>>(
        &self,
        name: &str,
        contents: C,
    ) -> std::io::Result<std::path::PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        for key in &self.env_vars {
            std::env::remove_var(key);
        }
    }
}
