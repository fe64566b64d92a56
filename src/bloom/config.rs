// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Configuration for the cache-backed Bloom filter.

use std::f64::consts::LN_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bloom::error::{BloomFilterError, Result};

/// Default number of addressable bits.
pub const DEFAULT_SIZE: u64 = 1_000;

/// Default number of hash rounds.
pub const DEFAULT_HASH_COUNT: u32 = 3;

/// Largest supported filter size.
///
/// Indices are derived from 32-bit digests, so bits past `2^32` could never
/// be addressed.
pub const MAX_SIZE: u64 = 1 << 32;

/// Digest used to derive bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HashAlgorithm {
    /// CRC-32 checksum; fastest, weakest mixing
    #[default]
    Crc32,
    /// MD5 digest
    Md5,
    /// SHA-1 digest; slowest
    Sha1,
}

impl HashAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [HashAlgorithm; 3] = [Self::Crc32, Self::Md5, Self::Sha1];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "crc32",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = BloomFilterError;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BloomFilterError::UnsupportedAlgorithm(name.to_string()))
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = BloomFilterError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<HashAlgorithm> for String {
    fn from(algorithm: HashAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}

fn default_size() -> u64 {
    DEFAULT_SIZE
}

fn default_hash_count() -> u32 {
    DEFAULT_HASH_COUNT
}

/// Configuration of one Bloom filter.
///
/// Identifies the bit vector in the cache store (`key`), its length in bits
/// (`size`), the number of hash rounds per operation (`hash_count`) and the
/// digest used for every round (`algorithm`).
///
/// `size` and `hash_count` are taken as given. [`optimal_size`] and
/// [`optimal_hash_count`] help choose them, or use [`FilterConfig::for_capacity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Key of the bit vector in the cache store
    #[serde(default)]
    key: String,

    /// Number of addressable bits
    #[serde(default = "default_size")]
    size: u64,

    /// Number of hash rounds per operation
    #[serde(default = "default_hash_count")]
    hash_count: u32,

    /// Digest used for index derivation
    #[serde(default)]
    algorithm: HashAlgorithm,
}

impl FilterConfig {
    /// Create a configuration for `key` with the default size (1000 bits),
    /// hash count (3) and algorithm (crc32).
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: DEFAULT_SIZE,
            hash_count: DEFAULT_HASH_COUNT,
            algorithm: HashAlgorithm::default(),
        }
    }

    /// Create and validate a configuration, parsing the algorithm by name.
    ///
    /// # Errors
    ///
    /// `UnsupportedAlgorithm` when `algorithm` is not crc32, md5 or sha1, and
    /// `InvalidConfiguration` for an empty key or out-of-range size or count.
    pub fn try_new(
        key: impl Into<String>,
        size: u64,
        hash_count: u32,
        algorithm: &str,
    ) -> Result<Self> {
        let algorithm = algorithm.parse()?;
        let config = Self::new(key)
            .with_size(size)
            .with_hash_count(hash_count)
            .with_algorithm(algorithm);
        config.validate()?;
        Ok(config)
    }

    /// Size a configuration for `expected_items` at the target false positive rate.
    pub fn for_capacity(
        key: impl Into<String>,
        expected_items: u64,
        false_positive_rate: f64,
    ) -> Result<Self> {
        let size = optimal_size(expected_items, false_positive_rate)?;
        let config = Self::new(key)
            .with_size(size)
            .with_hash_count(optimal_hash_count(size, expected_items));
        config.validate()?;
        Ok(config)
    }

    /// Set the number of addressable bits.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the number of hash rounds.
    pub fn with_hash_count(mut self, hash_count: u32) -> Self {
        self.hash_count = hash_count;
        self
    }

    /// Set the digest algorithm.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Key of the bit vector in the cache store.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of addressable bits.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of hash rounds per operation.
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Digest algorithm.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(BloomFilterError::InvalidConfiguration(
                "key must not be empty".to_string(),
            ));
        }

        if self.size == 0 {
            return Err(BloomFilterError::InvalidConfiguration(
                "size must be greater than 0".to_string(),
            ));
        }

        if self.size > MAX_SIZE {
            return Err(BloomFilterError::InvalidConfiguration(format!(
                "size {} exceeds the maximum of {MAX_SIZE} bits",
                self.size
            )));
        }

        if self.hash_count == 0 {
            return Err(BloomFilterError::InvalidConfiguration(
                "hash_count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Use `name` as the key when none was given.
    pub(crate) fn named(mut self, name: &str) -> Self {
        if self.key.trim().is_empty() {
            self.key = name.to_string();
        }
        self
    }
}

/// Optimal number of bits for `expected_items` at `false_positive_rate`.
///
/// This uses the formula: m = -n*ln(p)/(ln(2)^2) where:
/// - m = number of bits
/// - n = expected number of items
/// - p = false positive probability
pub fn optimal_size(expected_items: u64, false_positive_rate: f64) -> Result<u64> {
    if expected_items == 0 {
        return Err(BloomFilterError::InvalidConfiguration(
            "expected_items must be greater than 0".to_string(),
        ));
    }

    if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
        return Err(BloomFilterError::InvalidConfiguration(format!(
            "false positive rate must be between 0.0 and 1.0 exclusive, got {false_positive_rate}"
        )));
    }

    let n = expected_items as f64;
    let m = -n * false_positive_rate.ln() / (LN_2 * LN_2);
    Ok(m.ceil() as u64)
}

/// Optimal number of hash rounds for a filter of `size` bits holding
/// `expected_items`.
///
/// This uses the formula: k = (m/n)*ln(2), never less than one.
pub fn optimal_hash_count(size: u64, expected_items: u64) -> u32 {
    if expected_items == 0 {
        return 1;
    }

    let k = (size as f64 / expected_items as f64) * LN_2;
    k.round().max(1.0) as u32
}

/// Expected false positive probability after `inserted_items` distinct
/// insertions: (1 - e^(-k*n/m))^k.
pub fn estimated_false_positive_rate(hash_count: u32, inserted_items: u64, size: u64) -> f64 {
    if size == 0 {
        return 1.0;
    }

    let k = f64::from(hash_count);
    let fill = 1.0 - (-k * inserted_items as f64 / size as f64).exp();
    fill.powf(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = FilterConfig::new("users");
        assert_eq!(config.key(), "users");
        assert_eq!(config.size(), 1_000);
        assert_eq!(config.hash_count(), 3);
        assert_eq!(config.algorithm(), HashAlgorithm::Crc32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = FilterConfig::new("emails")
            .with_size(50_000)
            .with_hash_count(5)
            .with_algorithm(HashAlgorithm::Sha1);

        assert_eq!(config.size(), 50_000);
        assert_eq!(config.hash_count(), 5);
        assert_eq!(config.algorithm(), HashAlgorithm::Sha1);
    }

    #[test_case("crc32", HashAlgorithm::Crc32 ; "crc32")]
    #[test_case("md5", HashAlgorithm::Md5 ; "md5")]
    #[test_case("sha1", HashAlgorithm::Sha1 ; "sha1")]
    #[test_case("SHA1", HashAlgorithm::Sha1 ; "uppercase")]
    #[test_case(" md5 ", HashAlgorithm::Md5 ; "padded")]
    fn test_parse_algorithm(name: &str, expected: HashAlgorithm) {
        assert_eq!(name.parse::<HashAlgorithm>().unwrap(), expected);
    }

    #[test_case("sha256" ; "sha256")]
    #[test_case("murmur3" ; "murmur3")]
    #[test_case("" ; "empty")]
    fn test_parse_unsupported_algorithm(name: &str) {
        let err = name.parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, BloomFilterError::UnsupportedAlgorithm(n) if n == name));
    }

    #[test]
    fn test_try_new_rejects_unknown_algorithm() {
        let err = FilterConfig::try_new("t1", 1_000, 3, "sha512").unwrap_err();
        assert!(matches!(err, BloomFilterError::UnsupportedAlgorithm(_)));
    }

    #[test_case("", 1_000, 3 ; "empty key")]
    #[test_case("   ", 1_000, 3 ; "blank key")]
    #[test_case("k", 0, 3 ; "zero size")]
    #[test_case("k", MAX_SIZE + 1, 3 ; "oversized")]
    #[test_case("k", 1_000, 0 ; "zero hash count")]
    fn test_invalid_configuration(key: &str, size: u64, hash_count: u32) {
        let err = FilterConfig::try_new(key, size, hash_count, "md5").unwrap_err();
        assert!(matches!(err, BloomFilterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_max_size_is_accepted() {
        assert!(FilterConfig::try_new("k", MAX_SIZE, 1, "crc32").is_ok());
    }

    #[test]
    fn test_named_fills_missing_key_only() {
        let config: FilterConfig = toml::from_str("size = 64").unwrap();
        assert_eq!(config.key(), "");
        assert_eq!(config.hash_count(), DEFAULT_HASH_COUNT);

        assert_eq!(config.clone().named("users").key(), "users");
        assert_eq!(FilterConfig::new("explicit").named("users").key(), "explicit");
    }

    #[test]
    fn test_deserialize_rejects_unknown_algorithm() {
        let err = toml::from_str::<FilterConfig>("key = \"k\"\nalgorithm = \"sha256\"").unwrap_err();
        assert!(err.to_string().contains("Unsupported hash algorithm: sha256"));
    }

    #[test]
    fn test_serialize_uses_algorithm_name() {
        let config = FilterConfig::new("k").with_algorithm(HashAlgorithm::Md5);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["algorithm"], "md5");
        assert_eq!(json["size"], 1_000);
    }

    #[test]
    fn test_optimal_size() {
        assert_eq!(optimal_size(1_000_000, 0.01).unwrap(), 9_585_059);
        assert_eq!(optimal_size(10_000, 0.01).unwrap(), 95_851);
        assert!(optimal_size(0, 0.01).is_err());
        assert!(optimal_size(10, 0.0).is_err());
        assert!(optimal_size(10, 1.0).is_err());
        assert!(optimal_size(10, f64::NAN).is_err());
    }

    #[test]
    fn test_optimal_hash_count() {
        assert_eq!(optimal_hash_count(9_585_059, 1_000_000), 7);
        assert_eq!(optimal_hash_count(14_378, 1_000), 10);
        assert_eq!(optimal_hash_count(10, 1_000), 1);
        assert_eq!(optimal_hash_count(10, 0), 1);
    }

    #[test]
    fn test_for_capacity() {
        let config = FilterConfig::for_capacity("users", 1_000_000, 0.01).unwrap();
        assert_eq!(config.size(), 9_585_059);
        assert_eq!(config.hash_count(), 7);
        assert_eq!(config.algorithm(), HashAlgorithm::Crc32);
    }

    #[test]
    fn test_estimated_false_positive_rate() {
        let rate = estimated_false_positive_rate(7, 10_000, 100_000);
        assert!((rate - 0.008_193_7).abs() < 1e-6);

        assert_eq!(estimated_false_positive_rate(3, 0, 1_000), 0.0);
        assert_eq!(estimated_false_positive_rate(3, 10, 0), 1.0);
    }
}
