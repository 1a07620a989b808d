//! Coverage accounting for a harvest run

use crate::query::DateInterval;
use std::fmt;

/// Why part of the requested range was not fully harvested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapReason {
    /// A single day still reported at least the cap; only the records the
    /// source exposes were harvested
    SaturatedDay { count: u64 },

    /// The interval's first page never verified within the retry budget
    VerificationExhausted { message: String },

    /// The interval's count request failed for another reason and was skipped
    Skipped { message: String },
}

/// A date interval whose records may be incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub interval: DateInterval,
    pub reason: GapReason,
}

impl CoverageGap {
    pub fn new(interval: DateInterval, reason: GapReason) -> Self {
        Self { interval, reason }
    }

    /// Returns true if no finalized query covers this interval at all
    pub fn is_unharvested(&self) -> bool {
        !matches!(self.reason, GapReason::SaturatedDay { .. })
    }
}

impl fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            GapReason::SaturatedDay { count } => {
                write!(f, "{}: single day reports {} results", self.interval, count)
            }
            GapReason::VerificationExhausted { message } => {
                write!(f, "{}: verification exhausted ({})", self.interval, message)
            }
            GapReason::Skipped { message } => write!(f, "{}: skipped ({})", self.interval, message),
        }
    }
}

/// Closed classification of page-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipKind {
    /// Page content never appeared within the retry budget
    VerificationTimeout,

    /// Page had no results table
    SurfaceAbsent,

    /// A row lacked the pieces the archive URLs need
    MalformedRow,

    /// Anything else
    Unclassified,
}

impl SkipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationTimeout => "verification-timeout",
            Self::SurfaceAbsent => "surface-absent",
            Self::MalformedRow => "malformed-row",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page whose records were not written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSkip {
    pub query: String,
    pub page: u32,
    pub kind: SkipKind,
    pub message: String,
}

/// A finalized query that could not be harvested at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedQuery {
    pub query: String,
    pub message: String,
    /// Rows appended before the failure
    pub records_written: u64,
}

/// Outcome of one harvest run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub interval: DateInterval,
    pub queries_planned: usize,
    pub queries_harvested: usize,
    pub records_written: u64,
    pub page_skips: Vec<PageSkip>,
    pub coverage_gaps: Vec<CoverageGap>,
    pub failed_queries: Vec<FailedQuery>,
}

impl HarvestReport {
    pub fn new(interval: DateInterval) -> Self {
        Self {
            interval,
            queries_planned: 0,
            queries_harvested: 0,
            records_written: 0,
            page_skips: Vec::new(),
            coverage_gaps: Vec::new(),
            failed_queries: Vec::new(),
        }
    }

    /// Returns true if nothing was skipped, failed, or capped
    pub fn is_complete(&self) -> bool {
        self.page_skips.is_empty() && self.coverage_gaps.is_empty() && self.failed_queries.is_empty()
    }
}
