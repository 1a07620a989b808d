//! Scripted fetcher and HTML fixtures shared by the integration tests

use async_trait::async_trait;
use chrono::NaiveDate;
use edgar_harvest::fetcher::{Check, FetchError, FetchResult, PageFetcher, ResultsPage};
use edgar_harvest::query::{DateInterval, SearchCriteria, SearchEndpoint};
use std::cell::RefCell;
use url::Url;

/// Base URL the scripted fetcher decodes requests from
pub const TEST_BASE_URL: &str = "https://edgar.test/search?";

/// The parts of a request URL the scripts dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub page: u32,
}

impl Request {
    pub fn is(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start == start && self.end == end
    }
}

type Responder = Box<dyn Fn(&Request) -> FetchResult<String>>;

/// In-memory fetcher that answers each request from a script
///
/// The scripted body is checked with the caller's predicate; a body that
/// fails the check surfaces as [`FetchError::VerificationExhausted`].
pub struct ScriptedFetcher {
    responder: Responder,
    requests: RefCell<Vec<Request>>,
}

impl ScriptedFetcher {
    pub fn new(responder: impl Fn(&Request) -> FetchResult<String> + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Every request made so far, in order
    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_verified(&self, url: &str, check: Check<'_>) -> FetchResult<ResultsPage> {
        let request = parse_request(url);
        self.requests.borrow_mut().push(request);

        let html = (self.responder)(&request)?;
        let page = ResultsPage::new(url, html);
        if check(&page) {
            Ok(page)
        } else {
            Err(FetchError::VerificationExhausted {
                url: url.to_string(),
                attempts: 1,
            })
        }
    }
}

fn parse_request(url: &str) -> Request {
    let parsed = Url::parse(url).unwrap();
    let mut start = None;
    let mut end = None;
    let mut page = None;

    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "startdt" => start = Some(value.parse().unwrap()),
            "enddt" => end = Some(value.parse().unwrap()),
            "page" => page = Some(value.parse().unwrap()),
            _ => {}
        }
    }

    Request {
        start: start.unwrap(),
        end: end.unwrap(),
        page: page.unwrap(),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn interval(start: NaiveDate, end: NaiveDate) -> DateInterval {
    DateInterval::new(start, end).unwrap()
}

pub fn endpoint() -> SearchEndpoint {
    SearchEndpoint::new(TEST_BASE_URL)
}

pub fn criteria() -> SearchCriteria {
    SearchCriteria::new(["climate", "risk"])
}

/// A results page showing `count` with the given table rows
pub fn results_html(count: u64, rows: &[String]) -> String {
    format!(
        r#"<html><body>
        <div id="show-result-count">{} results</div>
        <div id="hits"><table><tbody>{}</tbody></table></div>
        </body></html>"#,
        with_separators(count),
        rows.concat()
    )
}

/// A results page showing `count` and an empty table
pub fn count_html(count: u64) -> String {
    results_html(count, &[])
}

/// A results page whose table body holds only a script, no rows
pub fn rowless_table_html(count: u64) -> String {
    format!(
        r#"<html><body>
        <div id="show-result-count">{} results</div>
        <div id="hits"><table><tbody><script>loading()</script></tbody></table></div>
        </body></html>"#,
        with_separators(count)
    )
}

/// A complete filing row whose identifiers all derive from `id`
pub fn filing_row(id: u32) -> String {
    format!(
        r##"<tr>
          <td class="filetype"><a class="preview-file" data-adsh="{adsh}"
              data-file-name="doc{id}.htm" href="#">10-K</a></td>
          <td class="filed">2024-01-01</td>
          <td class="enddate">2023-12-31</td>
          <td class="entity-name">Company {id}</td>
          <td class="cik">CIK {cik}</td>
          <td class="biz-location">Boston, MA</td>
          <td class="incorporated">DE</td>
          <td class="file-num"><a href="https://example.com/filenum/{id}">001-{id}</a></td>
          <td class="film-num">{id}</td>
        </tr>"##,
        adsh = format!("{:010}-24-{:06}", id, id),
        cik = format!("{:010}", id),
        id = id
    )
}

/// Rows `first..first + n` as filing rows
pub fn filing_rows(first: u32, n: u32) -> Vec<String> {
    (first..first + n).map(filing_row).collect()
}

/// A row without the preview link needed to build its URLs
pub fn malformed_row() -> String {
    r#"<tr><td class="filed">2024-01-02</td><td class="entity-name">Broken Corp</td></tr>"#
        .to_string()
}

fn with_separators(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
