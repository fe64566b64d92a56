//! Cachebloom Library
//!
//! Bloom filters whose bit vectors live in a shared, bit-addressable cache
//! store such as Redis. Processes that build a filter with the same
//! configuration derive the same bit indices, so they all see one set.
//!
//! # Architecture
//!
//! - [`bloom`]: index derivation, filter configuration and the filter itself
//! - [`store`]: the cache store traits and the bundled backends
//! - [`registry`]: logical filter names mapped to their configuration
//! - [`scaffold`]: generation of preset files for the registry
//! - [`config`] and [`error`]: application configuration and error types
//!
//! The store handle is always injected; nothing is looked up globally.

pub mod bloom;
pub mod config;
pub mod error;
pub mod registry;
pub mod scaffold;
pub mod store;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for cachebloom.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use bloom::{BloomFilter, BloomFilterError, FilterConfig, HashAlgorithm};
pub use registry::FilterRegistry;
pub use store::{BitStore, CacheStore};
