//! Pagination through a finalized query's results

use crate::fetcher::{extract_rows, FetchError, PageFetcher, ResultsPage};
use crate::harvest::partition::fetch_count;
use crate::harvest::report::SkipKind;
use crate::query::{Query, SearchEndpoint};
use crate::record::{parse_row, FilingRecord, RowError};
use crate::{HarvestError, PAGE_SIZE, RESULT_CAP};
use thiserror::Error;

/// Why one page produced no records
#[derive(Debug, Clone, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Row {row} could not be parsed: {source}")]
    Row { row: usize, source: RowError },
}

impl PageError {
    pub fn kind(&self) -> SkipKind {
        match self {
            Self::Fetch(FetchError::VerificationExhausted { .. }) => SkipKind::VerificationTimeout,
            Self::Fetch(FetchError::ResultsSurfaceNotFound { .. }) => SkipKind::SurfaceAbsent,
            Self::Fetch(_) => SkipKind::Unclassified,
            Self::Row { .. } => SkipKind::MalformedRow,
        }
    }
}

/// One page's worth of records, or the reason it was skipped
#[derive(Debug, Clone)]
pub struct HarvestedPage {
    pub number: u32,
    pub outcome: Result<Vec<FilingRecord>, PageError>,
}

/// Number of pages needed to show `count` results
pub fn page_count(count: u64) -> u32 {
    count.div_ceil(PAGE_SIZE) as u32
}

/// Opens finalized queries for pagination
pub struct Harvester<'a> {
    fetcher: &'a dyn PageFetcher,
    endpoint: &'a SearchEndpoint,
}

impl<'a> Harvester<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, endpoint: &'a SearchEndpoint) -> Self {
        Self { fetcher, endpoint }
    }

    /// Reads the query's result count and returns a cursor over its pages
    ///
    /// # Returns
    ///
    /// * `Ok(PageCursor)` - Ready to yield `ceil(min(count, 10000) / 100)` pages
    /// * `Err(HarvestError)` - Page 1 failed to verify or its count is unreadable
    pub async fn open(&self, query: &Query) -> Result<PageCursor<'a>, HarvestError> {
        let result_count = fetch_count(self.fetcher, self.endpoint, query).await?;
        // Pages past the cap are never served
        let num_pages = page_count(result_count.min(RESULT_CAP));

        tracing::info!(
            "Found {} results / {} = {} pages for {}",
            result_count,
            PAGE_SIZE,
            num_pages,
            query
        );

        Ok(PageCursor {
            fetcher: self.fetcher,
            endpoint: self.endpoint,
            query: query.clone(),
            result_count,
            num_pages,
            next: 1,
        })
    }
}

/// One-pass cursor over a query's result pages
///
/// Each call to [`PageCursor::next_page`] fetches and parses exactly one
/// page. Failures are returned in the page's outcome and never end the
/// sequence early.
pub struct PageCursor<'a> {
    fetcher: &'a dyn PageFetcher,
    endpoint: &'a SearchEndpoint,
    query: Query,
    result_count: u64,
    num_pages: u32,
    next: u32,
}

impl PageCursor<'_> {
    pub fn result_count(&self) -> u64 {
        self.result_count
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Fetches the next page, or returns `None` once every page was visited
    pub async fn next_page(&mut self) -> Option<HarvestedPage> {
        if self.next > self.num_pages {
            return None;
        }

        let number = self.next;
        self.next += 1;

        let url = self.endpoint.url_for(&self.query, number);
        let outcome = match self.fetcher.fetch_verified(&url, &ResultsPage::has_rows).await {
            Ok(page) => parse_page(&page),
            Err(e) => Err(PageError::Fetch(e)),
        };

        Some(HarvestedPage { number, outcome })
    }
}

/// Parses every row of a fetched page
///
/// One malformed row fails the whole page.
pub fn parse_page(page: &ResultsPage) -> Result<Vec<FilingRecord>, PageError> {
    let document = page.document();
    let rows = extract_rows(&document, page.url())?;

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| parse_row(row).map_err(|source| PageError::Row { row: i + 1, source }))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Parsed {} rows from {}", records.len(), page.url());
    Ok(records)
}
