// Copyright (c) 2025 Cachebloom Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Filter preset generation.
//!
//! Writes a commented `<name>.toml` preset that the registry picks up from
//! the presets directory. Existing presets are never overwritten.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::bloom::{BloomFilterError, FilterConfig};

/// Errors raised while writing a preset.
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    /// The preset name cannot be used as a file name
    #[error("Invalid preset name `{0}`: use letters, digits, `_` or `-`")]
    InvalidName(String),

    /// A preset with this name already exists
    #[error("Bloom filter preset already exists: {0:?}")]
    PresetExists(PathBuf),

    /// The preset configuration does not validate
    #[error(transparent)]
    Filter(#[from] BloomFilterError),

    /// Writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidName(name.to_string()))
    }
}

/// Render the preset file for `config`.
pub fn render_preset(name: &str, config: &FilterConfig) -> String {
    let key = toml::Value::String(config.key().to_string());

    format!(
        r#"# Bloom filter preset `{name}`.

# Key of the bit vector in the cache store.
# Filters sharing a key share the same set.
key = {key}

# Number of bits in the filter.
#
# Optimal size for n expected items at false positive rate p:
#   m = -n * ln(p) / (ln(2)^2)
# For 1 million items at 0.01: m = 9,585,059 bits.
# Sizes above 4294967296 bits are rejected.
size = {size}

# Number of hash rounds per operation.
#
# Optimal count for a filter of m bits holding n items:
#   k = (m / n) * ln(2)
# For 1 million items in 9,585,059 bits: k = 7.
hash_count = {hash_count}

# Hash algorithm: "crc32" (fastest), "md5" or "sha1" (slowest).
algorithm = "{algorithm}"
"#,
        size = config.size(),
        hash_count = config.hash_count(),
        algorithm = config.algorithm(),
    )
}

/// Write the preset `<dir>/<name>.toml` for `config`, creating `dir` if needed.
///
/// Returns the path written.
///
/// # Errors
///
/// `InvalidName` for names unusable as file names, `PresetExists` when the
/// file is already there, and `Filter` when `config` does not validate.
pub fn scaffold_preset(dir: &Path, name: &str, config: &FilterConfig) -> Result<PathBuf, ScaffoldError> {
    validate_name(name)?;
    config.validate()?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.toml"));

    if path.exists() {
        return Err(ScaffoldError::PresetExists(path));
    }

    // A failed write must never leave a partial preset at `path`.
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(render_preset(name, config).as_bytes())?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(&path) {
        Ok(_) => {}
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ScaffoldError::PresetExists(path));
        }
        Err(e) => return Err(e.error.into()),
    }

    tracing::info!(path = %path.display(), "Created Bloom filter preset");

    Ok(path)
}
