// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Bloom filters stored in a shared cache.
//!
//! A space-efficient probabilistic set whose bit vector lives in a cache
//! store rather than in process memory. Every process that builds a filter
//! with the same configuration addresses the same bits, so the set is shared
//! by all of them.
//!
//! # Features
//!
//! - Deterministic index derivation with CRC-32, MD5 or SHA-1.
//! - No false negatives; false positives bounded by the usual Bloom filter formula.
//! - Backend capability checked once, at construction.
//! - Stateless operations: only the immutable configuration is held locally.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cachebloom_lib::bloom::{BloomFilter, FilterConfig};
//! use cachebloom_lib::store::MemoryBitStore;
//!
//! let store = Arc::new(MemoryBitStore::new());
//! let filter = BloomFilter::new(FilterConfig::new("seen_urls"), store).unwrap();
//!
//! filter.add("https://example.com/").unwrap();
//! assert!(filter.contains("https://example.com/").unwrap());
//! ```
//!
//! # Sizing
//!
//! For `n` expected items at false positive rate `p`, the optimal size is
//! `m = -n*ln(p)/(ln(2)^2)` bits and the optimal hash count is
//! `k = (m/n)*ln(2)`. One million items at 1% need about 9.6 million bits and
//! 7 hash rounds:
//!
//! ```
//! use cachebloom_lib::bloom::FilterConfig;
//!
//! let config = FilterConfig::for_capacity("users_email_filter", 1_000_000, 0.01).unwrap();
//! assert_eq!(config.size(), 9_585_059);
//! assert_eq!(config.hash_count(), 7);
//! ```

mod config;
mod error;
mod filter;
mod hash;

pub use config::{
    estimated_false_positive_rate, optimal_hash_count, optimal_size, FilterConfig,
    HashAlgorithm, DEFAULT_HASH_COUNT, DEFAULT_SIZE, MAX_SIZE,
};
pub use error::{BloomFilterError, Result};
pub use filter::BloomFilter;
pub use hash::HashIndexer;
