// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bit index derivation for the cache-backed Bloom filter.
//!
//! Round `i` hashes the value with the decimal text of `i` appended, so
//! `"alice"` is digested as `"alice0"`, `"alice1"`, and so on. The leading 32
//! bits of the digest, read as an unsigned big-endian integer, are reduced
//! modulo the filter size. Any process using the same configuration derives
//! the same indices, which is what lets independent clients share one bit
//! vector.

use std::fmt;

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::bloom::config::{FilterConfig, HashAlgorithm};
use crate::bloom::error::{BloomFilterError, Result};

/// Digest function reducing input bytes to an unsigned 32-bit value.
type DigestFn = fn(&[u8]) -> u32;

impl HashAlgorithm {
    /// The digest function for this algorithm.
    fn digest_fn(self) -> DigestFn {
        match self {
            Self::Crc32 => crc32,
            Self::Md5 => md5_prefix,
            Self::Sha1 => sha1_prefix,
        }
    }

    /// Unsigned 32-bit digest of `data` as used for index derivation.
    ///
    /// CRC-32 yields the checksum itself; MD5 and SHA-1 yield the first
    /// eight hex characters of the digest, i.e. its first four bytes.
    pub fn digest32(self, data: &[u8]) -> u32 {
        (self.digest_fn())(data)
    }
}

fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

fn md5_prefix(data: &[u8]) -> u32 {
    leading_u32(&Md5::digest(data))
}

fn sha1_prefix(data: &[u8]) -> u32 {
    leading_u32(&Sha1::digest(data))
}

fn leading_u32(digest: &[u8]) -> u32 {
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Maps values to the ordered bit indices of a filter.
///
/// The digest function is resolved once, when the indexer is built.
#[derive(Clone, Copy)]
pub struct HashIndexer {
    algorithm: HashAlgorithm,
    digest: DigestFn,
    hash_count: u32,
    size: u64,
}

impl HashIndexer {
    /// Create an indexer producing `hash_count` indices in `[0, size)`.
    ///
    /// Fails with `InvalidConfiguration` when `size` is zero.
    pub fn new(algorithm: HashAlgorithm, hash_count: u32, size: u64) -> Result<Self> {
        if size == 0 {
            return Err(BloomFilterError::InvalidConfiguration(
                "size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            algorithm,
            digest: algorithm.digest_fn(),
            hash_count,
            size,
        })
    }

    /// Create the indexer for a filter configuration.
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Self::new(config.algorithm(), config.hash_count(), config.size())
    }

    /// Algorithm in use.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of indices produced per value.
    pub fn hash_count(&self) -> u32 {
        self.hash_count
    }

    /// Exclusive upper bound of produced indices.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bit index of `value` for hash round `round`.
    pub fn index(&self, value: &str, round: u32) -> u64 {
        let data = format!("{value}{round}");
        u64::from((self.digest)(data.as_bytes())) % self.size
    }

    /// Lazily yields the indices of `value` in round order.
    ///
    /// Duplicates are not removed; setting the same bit twice is harmless.
    pub fn indices<'a>(&'a self, value: &'a str) -> impl Iterator<Item = u64> + 'a {
        (0..self.hash_count).map(move |round| self.index(value, round))
    }

    /// All indices of `value` in round order.
    pub fn compute(&self, value: &str) -> Vec<u64> {
        self.indices(value).collect()
    }
}

impl fmt::Debug for HashIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashIndexer")
            .field("algorithm", &self.algorithm)
            .field("hash_count", &self.hash_count)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test_case(HashAlgorithm::Crc32, &[735, 457, 355] ; "crc32")]
    #[test_case(HashAlgorithm::Md5, &[797, 636, 108] ; "md5")]
    #[test_case(HashAlgorithm::Sha1, &[447, 771, 973] ; "sha1")]
    fn test_known_indices(algorithm: HashAlgorithm, expected: &[u64]) {
        let indexer = HashIndexer::new(algorithm, 3, 1_000).unwrap();
        assert_eq!(indexer.compute("alice@example.com"), expected);
    }

    #[test_case(HashAlgorithm::Crc32, &[4_030_130_578, 2_268_190_980, 507_021_502, 1_765_783_592] ; "crc32")]
    #[test_case(HashAlgorithm::Md5, &[1_332_544_837, 540_726_783, 1_853_922_493, 2_095_627_791] ; "md5")]
    #[test_case(HashAlgorithm::Sha1, &[978_837_221, 2_298_336_645, 253_620_181, 1_406_140_918] ; "sha1")]
    fn test_full_width_digests(algorithm: HashAlgorithm, expected: &[u64]) {
        // With size 2^32 the reduction is the identity, exposing the raw digest
        let indexer = HashIndexer::new(algorithm, 4, 1 << 32).unwrap();
        assert_eq!(indexer.compute("hello"), expected);
    }

    #[test]
    fn test_prefix_matches_hex_rendering() {
        for value in ["", "a", "alice@example.com0", "ünïcödé7"] {
            let md5_hex = hex::encode(Md5::digest(value.as_bytes()));
            let sha1_hex = hex::encode(Sha1::digest(value.as_bytes()));

            assert_eq!(
                HashAlgorithm::Md5.digest32(value.as_bytes()),
                u32::from_str_radix(&md5_hex[..8], 16).unwrap()
            );
            assert_eq!(
                HashAlgorithm::Sha1.digest32(value.as_bytes()),
                u32::from_str_radix(&sha1_hex[..8], 16).unwrap()
            );
        }
    }

    #[test]
    fn test_rounds_are_salted_with_decimal_round() {
        let indexer = HashIndexer::new(HashAlgorithm::Md5, 12, 1 << 32).unwrap();
        let hashes = indexer.compute("v");

        assert_eq!(hashes[0], u64::from(HashAlgorithm::Md5.digest32(b"v0")));
        assert_eq!(hashes[11], u64::from(HashAlgorithm::Md5.digest32(b"v11")));
    }

    #[test]
    fn test_hash_stability() {
        let indexer = HashIndexer::new(HashAlgorithm::Sha1, 5, 1_024).unwrap();

        let first_run = indexer.compute("stable_hash_test");
        let second_run = indexer.compute("stable_hash_test");
        assert_eq!(first_run, second_run);
    }

    #[test]
    fn test_indices_within_range_and_count() {
        for algorithm in HashAlgorithm::ALL {
            let indexer = HashIndexer::new(algorithm, 10, 97).unwrap();
            let hashes = indexer.compute("test_string");

            assert_eq!(hashes.len(), 10);
            assert!(hashes.iter().all(|&h| h < 97));

            let unique = hashes.iter().collect::<HashSet<_>>();
            assert!(unique.len() >= 5);
        }
    }

    #[test]
    fn test_size_one_maps_everything_to_zero() {
        let indexer = HashIndexer::new(HashAlgorithm::Crc32, 4, 1).unwrap();
        assert_eq!(indexer.compute("anything"), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_different_inputs_produce_different_hashes() {
        let indexer = HashIndexer::new(HashAlgorithm::Crc32, 5, 1 << 20).unwrap();
        assert_ne!(indexer.compute("input1"), indexer.compute("input2"));
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = HashIndexer::new(HashAlgorithm::Md5, 3, 0).unwrap_err();
        assert!(matches!(err, BloomFilterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_from_config() {
        let config = FilterConfig::new("k")
            .with_size(512)
            .with_hash_count(6)
            .with_algorithm(HashAlgorithm::Md5);
        let indexer = HashIndexer::from_config(&config).unwrap();

        assert_eq!(indexer.algorithm(), HashAlgorithm::Md5);
        assert_eq!(indexer.hash_count(), 6);
        assert_eq!(indexer.size(), 512);
    }
}
