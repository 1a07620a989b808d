//! Row parser for results tables
//!
//! Each results row carries its fields in cells identified by class name.
//! Missing optional cells become `None`; only the pieces needed to build the
//! archive URLs are required.

use crate::record::FilingRecord;
use scraper::{ElementRef, Selector};
use thiserror::Error;

/// Root of the filing archive the derived URLs point into
pub const ARCHIVES_ROOT: &str = "https://www.sec.gov/Archives/edgar/data";

/// Errors for rows that lack what the archive URLs are built from
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("Row is missing required element '{0}'")]
    MissingElement(&'static str),

    #[error("Element '{element}' is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Row has no CIK in {0:?}")]
    MalformedCik(String),
}

/// Parses one results row into a [`FilingRecord`]
///
/// # Required pieces
///
/// - `.preview-file` with `data-adsh` (accession number) and `data-file-name`
/// - `.cik` whose text reads `CIK <digits>`
///
/// # Returns
///
/// * `Ok(FilingRecord)` - The parsed record
/// * `Err(RowError)` - The row cannot produce archive URLs
pub fn parse_row(row: ElementRef<'_>) -> Result<FilingRecord, RowError> {
    let preview = find(row, ".preview-file").ok_or(RowError::MissingElement(".preview-file"))?;
    let adsh = required_attr(preview, ".preview-file", "data-adsh")?;
    let file_name = required_attr(preview, ".preview-file", "data-file-name")?;

    let cik_text = cell_text(row, ".cik").ok_or(RowError::MissingElement(".cik"))?;
    let company_cik = cik_text
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| RowError::MalformedCik(cik_text.clone()))?;
    let cik_normalized = normalize_cik(&company_cik);

    let adsh_no_dash = adsh.replace('-', "");
    let folder = format!("{}/{}/{}", ARCHIVES_ROOT, cik_normalized, adsh_no_dash);

    let file_link = find(row, ".file-num a");

    Ok(FilingRecord {
        filing_type: cell_text(row, ".filetype"),
        filed_at: cell_text(row, ".filed"),
        reporting_for: cell_text(row, ".enddate"),
        entity_name: cell_text(row, ".entity-name"),
        company_cik,
        place_of_business: cell_text(row, ".biz-location"),
        incorporated_location: cell_text(row, ".incorporated"),
        file_num: file_link.map(element_text),
        film_num: cell_text(row, ".film-num"),
        file_num_search_url: file_link
            .and_then(|link| link.value().attr("href"))
            .map(str::to_string),
        filing_details_url: format!("{}/{}-index.html", folder, adsh),
        filing_document_url: format!("{}/{}", folder, file_name),
        cik_normalized,
    })
}

/// Strips leading zeros, keeping a lone zero for an all-zero CIK
fn normalize_cik(cik: &str) -> String {
    let trimmed = cik.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn find<'a>(row: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    row.select(&selector).next()
}

fn cell_text(row: ElementRef<'_>, css: &str) -> Option<String> {
    find(row, css).map(element_text)
}

/// Visible text with runs of whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn required_attr(
    element: ElementRef<'_>,
    name: &'static str,
    attribute: &'static str,
) -> Result<String, RowError> {
    element
        .value()
        .attr(attribute)
        .map(str::to_string)
        .ok_or(RowError::MissingAttribute {
            element: name,
            attribute,
        })
}
