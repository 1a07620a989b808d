use crate::query::{DateInterval, SearchCriteria};
use crate::InvalidRangeError;
use chrono::NaiveDate;
use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

/// Full-text search front end the query string is appended to
pub const DEFAULT_BASE_URL: &str = "https://www.sec.gov/edgar/search/#/";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Search criteria narrowed to one date interval
///
/// A query carries no page number. Pages are chosen at encode time, so the
/// same query serves both the count request and every paginated fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    criteria: Arc<SearchCriteria>,
    interval: DateInterval,
}

impl Query {
    pub fn new(criteria: Arc<SearchCriteria>, interval: DateInterval) -> Self {
        Self { criteria, interval }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn interval(&self) -> DateInterval {
        self.interval
    }

    /// Returns the same criteria narrowed to another interval
    pub fn narrowed(&self, interval: DateInterval) -> Self {
        Self {
            criteria: Arc::clone(&self.criteria),
            interval,
        }
    }

    /// Encodes the query for the given page as a transport-ready string
    ///
    /// # Parameter order
    ///
    /// `q`, `dateRange`, `category`, `entityName`, `startdt`, `enddt`, `page`.
    /// Optional parameters are left out entirely when absent so the search
    /// interface applies its own defaults.
    pub fn encode(&self, page: u32) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(phrase) = self.criteria.phrase() {
            serializer.append_pair("q", &phrase);
        }
        serializer.append_pair("dateRange", "custom");
        if let Some(category) = self.criteria.category {
            serializer.append_pair("category", category.code());
        }
        if let Some(entity) = self.criteria.entity() {
            serializer.append_pair("entityName", entity);
        }
        serializer.append_pair(
            "startdt",
            &self.interval.start().format(DATE_FORMAT).to_string(),
        );
        serializer.append_pair("enddt", &self.interval.end().format(DATE_FORMAT).to_string());
        serializer.append_pair("page", &page.to_string());

        serializer.finish()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.criteria.phrase() {
            Some(phrase) => write!(f, "[{}] {}", phrase, self.interval),
            None => write!(f, "{}", self.interval),
        }
    }
}

/// Encodes criteria, a date range and a page number in one step
///
/// # Returns
///
/// * `Ok(String)` - The canonical query string
/// * `Err(InvalidRangeError)` - `start` falls after `end`
pub fn encode_query(
    criteria: &SearchCriteria,
    start: NaiveDate,
    end: NaiveDate,
    page: u32,
) -> Result<String, InvalidRangeError> {
    let interval = DateInterval::new(start, end)?;
    Ok(Query::new(Arc::new(criteria.clone()), interval).encode(page))
}

/// Where encoded queries are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    base_url: String,
}

impl SearchEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Builds the full URL for one page of a query
    pub fn url_for(&self, query: &Query, page: u32) -> String {
        format!("{}{}", self.base_url, query.encode(page))
    }
}

impl Default for SearchEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
