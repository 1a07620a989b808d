use crate::fetcher::RetryPolicy;
use crate::query::{DateInterval, FilingCategory, SearchCriteria, SearchEndpoint, DEFAULT_BASE_URL};
use crate::{ConfigError, InvalidRangeError, DEFAULT_BATCHES_NUMBER};
use chrono::{Local, Months, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for Edgar-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub partition: PartitionConfig,
    pub output: OutputConfig,
}

/// What to search for
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Document words or phrases
    pub keywords: Vec<String>,

    /// Company name, ticker, or CIK
    pub entity: Option<String>,

    /// Filing category key, e.g. `"proxy_materials"`
    pub category: Option<FilingCategory>,

    /// Match the joined keywords as an exact phrase
    pub exact: bool,

    /// First filing date, defaults to five years before the end date
    #[serde(rename = "start-date")]
    pub start_date: Option<NaiveDate>,

    /// Last filing date, defaults to today
    #[serde(rename = "end-date")]
    pub end_date: Option<NaiveDate>,
}

/// Which page fetcher a harvest runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Headless Chromium rendering the JavaScript front end
    #[default]
    Browser,

    /// Plain GET requests against an endpoint that serves rendered pages
    Http,
}

impl FromStr for FetcherKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Validation(format!(
                "fetcher must be \"browser\" or \"http\", got \"{}\"",
                other
            ))),
        }
    }
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => f.write_str("browser"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Page fetching behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// `"browser"` (default) or `"http"`
    pub fetcher: FetcherKind,

    /// Prefix the encoded query string is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Upper bound on one fetch attempt (seconds)
    #[serde(rename = "wait-for-request-secs")]
    pub wait_for_request_secs: u64,

    /// Number of fetch-and-verify attempts before giving up
    #[serde(rename = "stop-after-n")]
    pub stop_after_n: u32,

    /// Pause between failed attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Give the browser a random desktop user agent instead of `user-agent`
    #[serde(rename = "random-user-agent")]
    pub random_user_agent: bool,

    /// Pause between checks of a page that is still rendering (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherKind::Browser,
            base_url: DEFAULT_BASE_URL.to_string(),
            wait_for_request_secs: 10,
            stop_after_n: 3,
            retry_delay_ms: 1000,
            user_agent: format!("edgar-harvest/{}", env!("CARGO_PKG_VERSION")),
            headless: true,
            random_user_agent: true,
            poll_interval_ms: 250,
        }
    }
}

/// Date range splitting
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Pieces a saturated interval is split into
    pub batches: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            batches: DEFAULT_BATCHES_NUMBER,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV file records are appended to
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "results.csv".to_string(),
        }
    }
}

impl Config {
    /// Builds the search criteria
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            keywords: self.search.keywords.clone(),
            entity: self.search.entity.clone(),
            category: self.search.category,
            exact: self.search.exact,
        }
    }

    /// Resolves the requested date range against today's date
    pub fn interval(&self) -> Result<DateInterval, InvalidRangeError> {
        self.interval_from(Local::now().date_naive())
    }

    /// Resolves the requested date range, filling gaps relative to `today`
    pub fn interval_from(&self, today: NaiveDate) -> Result<DateInterval, InvalidRangeError> {
        let end = self.search.end_date.unwrap_or(today);
        let start = self.search.start_date.unwrap_or_else(|| {
            end.checked_sub_months(Months::new(60))
                .unwrap_or(NaiveDate::MIN)
        });
        DateInterval::new(start, end)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.fetch.stop_after_n,
            timeout: Duration::from_secs(self.fetch.wait_for_request_secs),
            delay: Duration::from_millis(self.fetch.retry_delay_ms),
        }
    }

    pub fn endpoint(&self) -> SearchEndpoint {
        SearchEndpoint::new(self.fetch.base_url.clone())
    }
}
