//! Filing records parsed from results rows

mod parser;

pub use parser::{parse_row, RowError, ARCHIVES_ROOT};

use serde::Serialize;

/// Output column names, in write order
pub const COLUMNS: [&str; 12] = [
    "filing_type",
    "filed_at",
    "reporting_for",
    "entity_name",
    "company_cik",
    "place_of_business",
    "incorporated_location",
    "file_num",
    "film_num",
    "file_num_search_url",
    "filing_details_url",
    "filing_document_url",
];

/// One filing from a results table row
///
/// Optional fields are `None` when the row has no such cell and
/// `Some("")` when the cell exists but is empty. Field order matches
/// [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingRecord {
    pub filing_type: Option<String>,
    pub filed_at: Option<String>,
    pub reporting_for: Option<String>,
    pub entity_name: Option<String>,

    /// CIK as displayed, leading zeros included
    pub company_cik: String,

    pub place_of_business: Option<String>,
    pub incorporated_location: Option<String>,
    pub file_num: Option<String>,
    pub film_num: Option<String>,
    pub file_num_search_url: Option<String>,
    pub filing_details_url: String,
    pub filing_document_url: String,

    /// CIK with leading zeros stripped, as used in archive paths
    #[serde(skip)]
    pub cik_normalized: String,
}
