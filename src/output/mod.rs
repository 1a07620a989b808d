//! Output module for harvested records and run summaries
//!
//! This module handles:
//! - Appending filing records to a CSV destination
//! - Printing the end-of-run harvest report

mod csv_sink;
mod report;

pub use csv_sink::CsvSink;
pub use report::{format_report, print_report};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
