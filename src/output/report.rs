//! End-of-run harvest report

use crate::harvest::{HarvestReport, SkipKind};
use std::collections::HashMap;

/// Formats a harvest report as plain text
pub fn format_report(report: &HarvestReport) -> String {
    let mut out = String::new();

    out.push_str("=== Harvest Report ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  Date range: {}\n", report.interval));
    out.push_str(&format!(
        "  Queries harvested: {} / {}\n",
        report.queries_harvested, report.queries_planned
    ));
    out.push_str(&format!("  Records written: {}\n\n", report.records_written));

    if !report.page_skips.is_empty() {
        let mut by_kind: HashMap<SkipKind, usize> = HashMap::new();
        for skip in &report.page_skips {
            *by_kind.entry(skip.kind).or_default() += 1;
        }
        // Most frequent first
        let mut kinds: Vec<_> = by_kind.into_iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));

        out.push_str(&format!("Skipped Pages ({}):\n", report.page_skips.len()));
        for (kind, count) in kinds {
            out.push_str(&format!("  {}: {}\n", kind, count));
        }
        for skip in &report.page_skips {
            out.push_str(&format!(
                "  - page {} of {}: {}\n",
                skip.page, skip.query, skip.message
            ));
        }
        out.push('\n');
    }

    if !report.coverage_gaps.is_empty() {
        out.push_str(&format!("Coverage Gaps ({}):\n", report.coverage_gaps.len()));
        for gap in &report.coverage_gaps {
            out.push_str(&format!("  - {}\n", gap));
        }
        out.push('\n');
    }

    if !report.failed_queries.is_empty() {
        out.push_str(&format!("Failed Queries ({}):\n", report.failed_queries.len()));
        for failed in &report.failed_queries {
            out.push_str(&format!(
                "  - {}: {} ({} records written)\n",
                failed.query, failed.message, failed.records_written
            ));
        }
        out.push('\n');
    }

    if report.is_complete() {
        out.push_str("Coverage: complete\n");
    } else {
        out.push_str("Coverage: INCOMPLETE (see gaps above)\n");
    }

    out
}

/// Prints a harvest report to stdout
pub fn print_report(report: &HarvestReport) {
    print!("{}", format_report(report));
}
