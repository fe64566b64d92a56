//! Test modules for cachebloom.
//!
//! Cross-component tests live here:
//! - Property-based tests of the filter over every hash algorithm
//! - Mock-store tests of the exact store traffic each operation produces
//! - Configuration loading from files and environment variables
//! - Error conversions and classification

pub mod test_utils;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{config_strategy, memory_filter, value_strategy, values_strategy, TestFixture};

/// Number of proptest cases per property.
pub const PROPTEST_CASES: u32 = 64;
