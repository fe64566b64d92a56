//! Cachebloom - command-line entrypoint.
//!
//! Loads configuration, sets up logging and runs one filter command against
//! the configured cache store.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use cachebloom_lib::bloom::{FilterConfig, HashAlgorithm};
use cachebloom_lib::config::{AppConfig, ConfigLoader, LogConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};
use cachebloom_lib::registry::FilterRegistry;
use cachebloom_lib::scaffold::scaffold_preset;
use cachebloom_lib::store::open_store;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line arguments for cachebloom.
#[derive(Parser, Debug)]
#[clap(name = "cachebloom", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },

    /// Create a new Bloom filter preset
    Make {
        /// Name of the filter preset
        name: String,

        /// Directory to write the preset to (defaults to the configured presets_dir, or `filters`)
        #[clap(short, long, value_parser)]
        dir: Option<PathBuf>,

        /// Key of the bit vector (defaults to the name)
        #[clap(short, long)]
        key: Option<String>,

        /// Number of bits
        #[clap(long, default_value_t = cachebloom_lib::bloom::DEFAULT_SIZE)]
        size: u64,

        /// Number of hash rounds
        #[clap(long, default_value_t = cachebloom_lib::bloom::DEFAULT_HASH_COUNT)]
        hash_count: u32,

        /// Hash algorithm: crc32, md5 or sha1
        #[clap(long, default_value = "crc32")]
        algorithm: String,

        /// Size the filter for this many items (overrides --size and --hash-count)
        #[clap(long, requires = "false_positive_rate")]
        expected_items: Option<u64>,

        /// Target false positive rate used with --expected-items
        #[clap(long, requires = "expected_items")]
        false_positive_rate: Option<f64>,
    },

    /// Print the resolved configuration of a filter as JSON
    Show {
        /// Filter name
        filter: String,
    },

    /// Add values to a filter
    Add {
        /// Filter name
        filter: String,

        /// Values to add
        #[clap(required = true)]
        values: Vec<String>,
    },

    /// Check values against a filter; exits with status 1 if any is absent
    Check {
        /// Filter name
        filter: String,

        /// Values to check
        #[clap(required = true)]
        values: Vec<String>,
    },

    /// Delete the bit vector of a filter
    Clear {
        /// Filter name
        filter: String,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr so
/// command output on stdout stays machine-readable.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(log.source_location)
        .with_line_number(log.source_location);

    let installed = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.context("Failed to set global tracing subscriber")
}

/// Pick the explicit config file, or the default one if it exists.
fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default = Path::new(DEFAULT_CONFIG_PATH);
        default.exists().then(|| default.to_path_buf())
    })
}

fn preset_config(
    name: &str,
    key: Option<String>,
    size: u64,
    hash_count: u32,
    algorithm: &str,
    capacity: Option<(u64, f64)>,
) -> Result<FilterConfig> {
    let key = key.unwrap_or_else(|| name.to_string());
    let algorithm: HashAlgorithm = algorithm.parse()?;

    let config = match capacity {
        Some((expected_items, false_positive_rate)) => {
            FilterConfig::for_capacity(key, expected_items, false_positive_rate)?
        }
        None => FilterConfig::new(key)
            .with_size(size)
            .with_hash_count(hash_count),
    };

    Ok(config.with_algorithm(algorithm))
}

fn open_registry(config: &AppConfig) -> Result<FilterRegistry> {
    FilterRegistry::from_app_config(config).context("Failed to build filter registry")
}

/// Main entry point for the application.
fn main() -> Result<()> {
    let args = Args::parse();

    let loader = ConfigLoader::new(config_path(args.config), ENV_PREFIX);
    let config = loader.load().context("Failed to load configuration")?;

    init_logging(&config.log)?;

    match args.command {
        Command::Validate => {
            let registry = open_registry(&config)?;
            info!(filters = registry.len(), "Configuration validated successfully");
            println!("Configuration is valid ({} filters)", registry.len());
        }
        Command::GenConfig { output } => {
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }

            let toml = toml::to_string_pretty(&AppConfig::default())
                .context("Failed to serialize config")?;
            std::fs::write(&output, toml)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            info!("Default configuration written to {:?}", output);
        }
        Command::Make {
            name,
            dir,
            key,
            size,
            hash_count,
            algorithm,
            expected_items,
            false_positive_rate,
        } => {
            let capacity = expected_items.zip(false_positive_rate);
            let preset = preset_config(&name, key, size, hash_count, &algorithm, capacity)?;
            let dir = dir.unwrap_or_else(|| config.presets_dir_or_default().to_path_buf());

            match scaffold_preset(&dir, &name, &preset) {
                Ok(path) => {
                    println!("Bloom filter preset {name} created successfully!");
                    println!("Path: {}", path.display());
                }
                Err(e) => {
                    tracing::error!("{e}");
                    eprintln!("{e}");
                    process::exit(1);
                }
            }
        }
        Command::Show { filter } => {
            let registry = open_registry(&config)?;
            let resolved = registry.resolve(&filter)?;
            println!("{}", serde_json::to_string_pretty(resolved)?);
        }
        Command::Add { filter, values } => {
            let registry = open_registry(&config)?;
            let store = open_store(&config.store)?;
            let bloom = registry.open(&filter, store)?;

            for value in &values {
                bloom.add(value)?;
            }
            info!(filter = %filter, count = values.len(), "Added values");
        }
        Command::Check { filter, values } => {
            let registry = open_registry(&config)?;
            let store = open_store(&config.store)?;
            let bloom = registry.open(&filter, store)?;

            let mut all_present = true;
            for value in &values {
                let present = bloom.contains(value)?;
                all_present &= present;
                println!("{value}\t{}", if present { "maybe" } else { "no" });
            }

            if !all_present {
                process::exit(1);
            }
        }
        Command::Clear { filter } => {
            let registry = open_registry(&config)?;
            let store = open_store(&config.store)?;
            registry.open(&filter, store)?.clear()?;
            info!(filter = %filter, "Cleared filter");
        }
    }

    Ok(())
}
