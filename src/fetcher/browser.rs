//! Headless browser fetcher
//!
//! The search front end renders results with JavaScript and reads its query
//! from the URL fragment. Each fetch loads the URL in one Chromium tab and
//! polls the rendered DOM until the completion check passes or the
//! per-attempt timeout runs out.

use crate::config::FetchConfig;
use crate::fetcher::{retry_verified, Check, FetchError, FetchResult, PageFetcher, ResultsPage, RetryPolicy};
use crate::HarvestError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use rand::seq::SliceRandom;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const BLANK_PAGE: &str = "about:blank";

/// Common desktop user agents
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
];

/// Picks one of the built-in desktop user agents at random
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// How the browser session is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserOptions {
    pub headless: bool,

    /// Fixed user agent, or `None` to pick one per session
    pub user_agent: Option<String>,

    /// Pause between checks of a page that is still rendering
    pub poll_interval: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl From<&FetchConfig> for BrowserOptions {
    fn from(config: &FetchConfig) -> Self {
        Self {
            headless: config.headless,
            user_agent: (!config.random_user_agent).then(|| config.user_agent.clone()),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Fetches results pages through one Chromium tab
pub struct BrowserFetcher {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    policy: RetryPolicy,
    poll_interval: Duration,
}

impl BrowserFetcher {
    /// Launches Chromium and opens the tab every fetch reuses
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserFetcher)` - The session is ready
    /// * `Err(HarvestError::Browser)` - No Chromium could be found or started
    pub async fn launch(options: BrowserOptions, policy: RetryPolicy) -> Result<Self, HarvestError> {
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| random_user_agent().to_string());

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(policy.timeout)
            .arg(format!("--user-agent={}", user_agent));
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(HarvestError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| HarvestError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page(BLANK_PAGE)
            .await
            .map_err(|e| HarvestError::Browser(e.to_string()))?;

        tracing::info!(
            "Launched {} browser session as {}",
            if options.headless { "headless" } else { "windowed" },
            user_agent
        );

        Ok(Self {
            browser,
            page,
            handler,
            policy,
            poll_interval: options.poll_interval,
        })
    }

    /// Closes the browser and stops its event loop
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        self.handler.abort();
    }

    /// Loads `url` once and polls it until `check` passes
    async fn load_once(&self, url: &str, check: Check<'_>) -> FetchResult<Option<ResultsPage>> {
        // Blank first so the check never sees the previous query's results
        self.page
            .goto(BLANK_PAGE)
            .await
            .map_err(|e| classify_cdp(url, e))?;
        self.page.goto(url).await.map_err(|e| classify_cdp(url, e))?;

        let page = &self.page;
        poll_until(self.policy.timeout, self.poll_interval, check, move || async move {
            let html = page.content().await.map_err(|e| classify_cdp(url, e))?;
            Ok(ResultsPage::new(url, html))
        })
        .await
    }
}

#[async_trait(?Send)]
impl PageFetcher for BrowserFetcher {
    async fn fetch_verified(&self, url: &str, check: Check<'_>) -> FetchResult<ResultsPage> {
        retry_verified(url, self.policy, move || self.load_once(url, check)).await
    }
}

/// Re-reads a page until `check` passes or `timeout` elapses
///
/// Returns `Ok(None)` when the deadline passes without a passing snapshot.
/// The page is read at least once.
pub(crate) async fn poll_until<F, Fut>(
    timeout: Duration,
    interval: Duration,
    check: Check<'_>,
    mut snapshot: F,
) -> FetchResult<Option<ResultsPage>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<ResultsPage>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let page = snapshot().await?;
        if check(&page) {
            return Ok(Some(page));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(interval).await;
    }
}

fn classify_cdp(url: &str, error: CdpError) -> FetchError {
    match error {
        CdpError::Timeout => FetchError::Transport {
            url: url.to_string(),
            message: "Request timeout".to_string(),
        },
        other => FetchError::Unclassified {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}
