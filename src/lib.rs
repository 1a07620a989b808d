//! Edgar-Harvest: complete enumeration of capped full-text filing searches
//!
//! The search interface never reports more than [`RESULT_CAP`] matches for a
//! single query. This crate bisects the date range of a search until every
//! sub-query sits below the cap, then paginates each one and appends the
//! parsed filing records to a CSV file.

pub mod config;
pub mod fetcher;
pub mod harvest;
pub mod output;
pub mod query;
pub mod record;

use chrono::NaiveDate;
use thiserror::Error;

/// Maximum match count the source reports accurately for one query
pub const RESULT_CAP: u64 = 10_000;

/// Fixed number of rows on one results page
pub const PAGE_SIZE: u64 = 100;

/// Number of sub-intervals a saturated interval is split into
pub const DEFAULT_BATCHES_NUMBER: usize = 2;

/// Main error type for Edgar-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetcher::FetchError),

    #[error(transparent)]
    CountParse(#[from] CountParseError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown filing category: {0}")]
    UnknownCategory(String),
}

/// A date interval whose start falls after its end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid date range: start {start} is after end {end}")]
pub struct InvalidRangeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The displayed result count could not be read as an integer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse result count from {text:?}")]
pub struct CountParseError {
    /// Raw text of the count element, `None` when the element is missing
    pub text: Option<String>,
}

/// Result type alias for Edgar-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::{BrowserFetcher, Fetcher, HttpFetcher, PageFetcher, ResultsPage};
pub use harvest::{run_harvest, HarvestReport, Harvester, Partitioner};
pub use query::{DateInterval, FilingCategory, Query, SearchCriteria, SearchEndpoint};
pub use record::FilingRecord;
