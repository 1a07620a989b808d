//! HTTP fetcher implementation
//!
//! This module implements [`PageFetcher`] over plain HTTP, including:
//! - Building an HTTP client with a per-attempt timeout
//! - Fetch-and-verify attempts with a fixed pause between them
//! - Error classification for the final failed attempt
//!
//! The server must return the rendered results page. The search front end
//! keeps its parameters in the URL fragment, which HTTP never transmits, so
//! with this fetcher `base-url` must point at an endpoint that takes them as
//! a query string. Configuration validation rejects a fragment base URL here.

use crate::fetcher::{retry_verified, Check, FetchError, FetchResult, PageFetcher, ResultsPage};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// How long and how often a fetch may be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of full fetch-and-verify attempts (`stop_after_n`)
    pub attempts: u32,

    /// Upper bound on one attempt (`wait_for_request_secs`)
    pub timeout: Duration,

    /// Pause between failed attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            delay: Duration::from_secs(1),
        }
    }
}

/// Builds an HTTP client for fetching results pages
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
/// * `timeout` - Upper bound on one request, connection included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches results pages over HTTP with bounded retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    /// Creates a fetcher with its own client
    pub fn new(user_agent: &str, policy: RetryPolicy) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, policy.timeout)?;
        Ok(Self { client, policy })
    }

    /// Performs one GET and returns the body as a page
    async fn fetch_once(&self, url: &str) -> FetchResult<ResultsPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport(url, &e))?;

        Ok(ResultsPage::new(url, body))
    }
}

#[async_trait(?Send)]
impl PageFetcher for HttpFetcher {
    async fn fetch_verified(&self, url: &str, check: Check<'_>) -> FetchResult<ResultsPage> {
        retry_verified(url, self.policy, move || async move {
            let page = self.fetch_once(url).await?;
            Ok(check(&page).then_some(page))
        })
        .await
    }
}

fn classify_transport(url: &str, error: &reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Transport {
        url: url.to_string(),
        message,
    }
}
