//! Configuration module for Edgar-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; missing values fall back to defaults.
//!
//! # Example
//!
//! ```no_run
//! use edgar_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Retrying each fetch up to {} times", config.fetch.stop_after_n);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, FetcherKind, OutputConfig, PartitionConfig, SearchConfig,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, read_config};
pub use validation::validate;
