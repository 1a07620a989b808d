//! Query module for building search requests
//!
//! This module turns search criteria and a date interval into the canonical
//! query string the search interface understands, including:
//! - Search criteria and the closed set of filing categories
//! - Inclusive calendar date intervals and their splitting
//! - Deterministic query string encoding

mod criteria;
mod encoder;
mod interval;

pub use criteria::{FilingCategory, SearchCriteria};
pub use encoder::{encode_query, Query, SearchEndpoint, DEFAULT_BASE_URL};
pub use interval::DateInterval;
