//! Page fetching boundary
//!
//! This module defines the fetch-and-verify contract the harvest relies on,
//! including:
//! - The [`PageFetcher`] trait and its typed failures
//! - The fetched [`ResultsPage`], its verification predicates and row extraction
//! - The result-count reader
//! - [`BrowserFetcher`], a headless Chromium session that renders the front end
//! - [`HttpFetcher`], a reqwest-backed implementation for pre-rendered endpoints
//! - [`Fetcher`], whichever of the two `fetch.fetcher` selects

mod browser;
mod http;
mod page;

pub use browser::{random_user_agent, BrowserFetcher, BrowserOptions};
pub use http::{build_http_client, HttpFetcher, RetryPolicy};
pub use page::{extract_rows, parse_result_count, ResultsPage};

use crate::config::{Config, FetcherKind};
use crate::HarvestError;
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Errors surfaced by a fetch once its retry budget is spent
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The page arrived but never showed the expected content
    #[error("Verification failed for {url} after {attempts} attempt(s)")]
    VerificationExhausted { url: String, attempts: u32 },

    /// The page has no results table to read rows from
    #[error("Results table not found at {url}")]
    ResultsSurfaceNotFound { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected failure for {url}: {message}")]
    Unclassified { url: String, message: String },
}

impl FetchError {
    pub fn is_verification_exhausted(&self) -> bool {
        matches!(self, Self::VerificationExhausted { .. })
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Completion predicate evaluated against every fetched page
pub type Check<'a> = &'a dyn Fn(&ResultsPage) -> bool;

/// Fetch-and-verify capability shared by the whole harvest
///
/// One fetcher stands for one automation session, so callers await each
/// fetch before issuing the next.
#[async_trait(?Send)]
pub trait PageFetcher {
    /// Fetches `url` and checks the page with `check`
    ///
    /// The full fetch-and-verify cycle is retried within the implementation's
    /// budget before a failure is returned.
    async fn fetch_verified(&self, url: &str, check: Check<'_>) -> FetchResult<ResultsPage>;
}

/// Runs `attempt` until it yields a verified page or the budget is spent
///
/// Each attempt returns `Ok(None)` when the page loaded but failed its check.
/// The last failure is returned once every attempt has been used.
pub(crate) async fn retry_verified<F, Fut>(
    url: &str,
    policy: RetryPolicy,
    mut attempt: F,
) -> FetchResult<ResultsPage>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<Option<ResultsPage>>>,
{
    let attempts = policy.attempts.max(1);
    let exhausted = || FetchError::VerificationExhausted {
        url: url.to_string(),
        attempts,
    };
    let mut last_error = None;

    for n in 1..=attempts {
        tracing::debug!("Requesting {} (attempt {}/{})", url, n, attempts);

        match attempt().await {
            Ok(Some(page)) => {
                tracing::debug!("Successfully fetched {}", url);
                return Ok(page);
            }
            Ok(None) => {
                tracing::debug!("Page check failed for {}", url);
                last_error = Some(exhausted());
            }
            Err(e) => {
                tracing::debug!("Attempt {} failed: {}", n, e);
                last_error = Some(e);
            }
        }

        if n < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(last_error.unwrap_or_else(exhausted))
}

/// The fetcher chosen by configuration
pub enum Fetcher {
    Browser(BrowserFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    /// Launches the browser session or builds the HTTP client
    pub async fn connect(config: &Config) -> Result<Self, HarvestError> {
        let policy = config.retry_policy();
        match config.fetch.fetcher {
            FetcherKind::Browser => {
                let options = BrowserOptions::from(&config.fetch);
                Ok(Self::Browser(BrowserFetcher::launch(options, policy).await?))
            }
            FetcherKind::Http => Ok(Self::Http(HttpFetcher::new(
                &config.fetch.user_agent,
                policy,
            )?)),
        }
    }

    /// Shuts the browser down; a no-op for HTTP
    pub async fn close(self) {
        if let Self::Browser(browser) = self {
            browser.close().await;
        }
    }
}

#[async_trait(?Send)]
impl PageFetcher for Fetcher {
    async fn fetch_verified(&self, url: &str, check: Check<'_>) -> FetchResult<ResultsPage> {
        match self {
            Self::Browser(browser) => browser.fetch_verified(url, check).await,
            Self::Http(http) => http.fetch_verified(url, check).await,
        }
    }
}
