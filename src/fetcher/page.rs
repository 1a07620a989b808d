use crate::fetcher::{FetchError, FetchResult};
use crate::CountParseError;
use scraper::{ElementRef, Html, Selector};

const RESULTS_TABLE_SELECTOR: &str = "#hits table tbody";
const RESULT_COUNT_SELECTOR: &str = "#show-result-count";

/// A fetched results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsPage {
    url: String,
    html: String,
}

impl ResultsPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Parses the page into a queryable document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }

    /// Returns true if the results table has any visible text
    pub fn has_rows(&self) -> bool {
        let document = self.document();
        table_body(&document)
            .map(|body| !body.text().collect::<String>().trim().is_empty())
            .unwrap_or(false)
    }

    /// Returns true once the results surface has rendered
    ///
    /// Either the table has rows or the count element shows a number, which
    /// lets an interval with no filings read as zero results.
    pub fn is_loaded(&self) -> bool {
        self.has_rows() || self.result_count().is_ok()
    }

    /// Reads the total match count displayed for this page's query
    pub fn result_count(&self) -> Result<u64, CountParseError> {
        let document = self.document();
        let text = Selector::parse(RESULT_COUNT_SELECTOR)
            .ok()
            .and_then(|selector| {
                document
                    .select(&selector)
                    .next()
                    .map(|element| element.text().collect::<String>())
            })
            .ok_or(CountParseError { text: None })?;

        parse_result_count(&text)
    }
}

/// Parses a displayed count such as `"2,718 results"`
///
/// Thousands separators are dropped and the first word must be an integer.
/// Anything else, including `"10,000+"`, is a [`CountParseError`].
pub fn parse_result_count(text: &str) -> Result<u64, CountParseError> {
    let cleaned = text.replace(',', "");
    cleaned
        .split_whitespace()
        .next()
        .and_then(|word| word.parse::<u64>().ok())
        .ok_or_else(|| CountParseError {
            text: Some(text.trim().to_string()),
        })
}

fn table_body(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(RESULTS_TABLE_SELECTOR).ok()?;
    document.select(&selector).next()
}

/// Returns the row elements of the results table
///
/// # Returns
///
/// * `Ok(Vec<ElementRef>)` - The table's `<tr>` elements
/// * `Err(FetchError::ResultsSurfaceNotFound)` - No table, or a table without rows
pub fn extract_rows<'a>(document: &'a Html, url: &str) -> FetchResult<Vec<ElementRef<'a>>> {
    let not_found = || FetchError::ResultsSurfaceNotFound {
        url: url.to_string(),
    };

    let body = table_body(document).ok_or_else(not_found)?;
    let row_selector = Selector::parse("tr").map_err(|_| not_found())?;
    let rows: Vec<ElementRef<'a>> = body.select(&row_selector).collect();

    if rows.is_empty() {
        return Err(not_found());
    }

    tracing::debug!("Fetched {} rows from {}", rows.len(), url);
    Ok(rows)
}
