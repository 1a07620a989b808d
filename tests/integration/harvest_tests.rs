//! Pagination and CSV output against scripted pages

use crate::common::{
    count_html, criteria, date, endpoint, filing_rows, interval, malformed_row, results_html,
    rowless_table_html, Request, ScriptedFetcher,
};
use edgar_harvest::harvest::{run_harvest, GapReason, Harvester, SkipKind};
use edgar_harvest::query::{DateInterval, Query};
use edgar_harvest::record::COLUMNS;
use std::cell::Cell;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves `count` results for every interval, `rows_per_page` rows per page
fn uniform_fetcher(count: u64, rows_per_page: u32) -> ScriptedFetcher {
    ScriptedFetcher::new(move |r: &Request| {
        Ok(results_html(
            count,
            &filing_rows(r.page * 100, rows_per_page),
        ))
    })
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_page_counts_follow_result_count() {
    let endpoint = endpoint();
    let root = interval(date(2024, 1, 1), date(2024, 1, 31));

    for (count, expected_pages) in [(250, 3), (100, 1), (0, 0)] {
        let fetcher = if count == 0 {
            ScriptedFetcher::new(|_: &Request| Ok(count_html(0)))
        } else {
            uniform_fetcher(count, 1)
        };
        let harvester = Harvester::new(&fetcher, &endpoint);
        let query = Query::new(Arc::new(criteria()), root);

        let mut cursor = harvester.open(&query).await.unwrap();
        assert_eq!(cursor.result_count(), count);
        assert_eq!(cursor.num_pages(), expected_pages);

        let mut numbers = Vec::new();
        while let Some(page) = cursor.next_page().await {
            assert!(page.outcome.is_ok());
            numbers.push(page.number);
        }
        assert_eq!(numbers, (1..=expected_pages).collect::<Vec<_>>());

        // One count read of page 1, then one fetch per page
        assert_eq!(fetcher.requests().len(), 1 + expected_pages as usize);
    }
}

#[tokio::test]
async fn test_failed_page_is_skipped_and_harvest_continues() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");

    let root = interval(date(2024, 1, 1), date(2024, 1, 2));
    let day_one = date(2024, 1, 1);

    let fetcher = ScriptedFetcher::new(move |r: &Request| {
        if r.start != r.end {
            Ok(count_html(15_000))
        } else if r.start == day_one {
            if r.page == 3 {
                // Never shows rows
                Ok(count_html(450))
            } else {
                Ok(results_html(450, &filing_rows(r.page * 100, 2)))
            }
        } else {
            Ok(results_html(120, &filing_rows(1_000 + r.page * 100, 2)))
        }
    });

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(report.queries_planned, 2);
    assert_eq!(report.queries_harvested, 2);
    assert_eq!(report.records_written, 4 * 2 + 2 * 2);
    assert_eq!(report.page_skips.len(), 1);
    assert_eq!(report.page_skips[0].page, 3);
    assert_eq!(report.page_skips[0].kind, SkipKind::VerificationTimeout);
    assert!(!report.is_complete());

    let contents = std::fs::read_to_string(&output).unwrap();
    for page in [1, 2, 4, 5] {
        assert!(contents.contains(&format!("doc{}.htm", page * 100)));
    }
    assert!(!contents.contains("doc300.htm"));
    assert!(contents.contains("doc1100.htm"));
    assert!(contents.contains("doc1201.htm"));
}

#[tokio::test]
async fn test_malformed_row_skips_its_page() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");
    let root = interval(date(2024, 2, 1), date(2024, 2, 29));

    let fetcher = ScriptedFetcher::new(|r: &Request| {
        if r.page == 2 {
            let mut rows = filing_rows(200, 2);
            rows.push(malformed_row());
            Ok(results_html(150, &rows))
        } else {
            Ok(results_html(150, &filing_rows(r.page * 100, 3)))
        }
    });

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(report.records_written, 3);
    assert_eq!(report.page_skips.len(), 1);
    assert_eq!(report.page_skips[0].page, 2);
    assert_eq!(report.page_skips[0].kind, SkipKind::MalformedRow);

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 1 + 3);
    assert!(!lines.iter().any(|line| line.contains("doc200.htm")));
}

#[tokio::test]
async fn test_repeated_harvest_writes_one_header() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");
    let root = interval(date(2024, 3, 1), date(2024, 3, 31));
    let fetcher = uniform_fetcher(150, 2);

    let first = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();
    let second = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(first.records_written, 4);
    assert_eq!(second.records_written, 4);
    assert!(first.is_complete());

    let lines = read_lines(&output);
    assert_eq!(lines[0], COLUMNS.join(","));
    assert_eq!(lines.len(), 1 + 8);
    assert_eq!(
        lines.iter().filter(|line| line.starts_with("filing_type")).count(),
        1
    );
}

#[tokio::test]
async fn test_empty_harvest_writes_header_only() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");
    let root = DateInterval::day(date(2024, 12, 25));
    let fetcher = ScriptedFetcher::new(|_: &Request| Ok(count_html(0)));

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(report.queries_harvested, 1);
    assert_eq!(report.records_written, 0);
    assert_eq!(read_lines(&output), vec![COLUMNS.join(",")]);
}

#[tokio::test]
async fn test_saturated_day_reads_only_capped_pages() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");
    let root = DateInterval::day(date(2024, 4, 2));
    let fetcher = uniform_fetcher(12_000, 1);

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    // Partition count, open count, then pages 1..=100
    let requests = fetcher.requests();
    assert_eq!(requests.len(), 2 + 100);
    assert!(requests.iter().all(|r| r.page <= 100));

    assert!(report.page_skips.is_empty());
    assert_eq!(report.records_written, 100);
    assert_eq!(report.coverage_gaps.len(), 1);
    assert_eq!(
        report.coverage_gaps[0].reason,
        GapReason::SaturatedDay { count: 12_000 }
    );
}

#[tokio::test]
async fn test_query_failing_to_open_does_not_stop_the_next() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");

    let root = interval(date(2024, 1, 1), date(2024, 1, 2));
    let day_one = date(2024, 1, 1);
    let day_one_reads = Cell::new(0);

    let fetcher = ScriptedFetcher::new(move |r: &Request| {
        if r.start != r.end {
            return Ok(count_html(15_000));
        }
        if r.start == day_one {
            day_one_reads.set(day_one_reads.get() + 1);
            // Counted once during partitioning, blank afterwards
            if day_one_reads.get() == 1 {
                Ok(results_html(50, &filing_rows(100, 2)))
            } else {
                Ok("<html></html>".to_string())
            }
        } else {
            Ok(results_html(30, &filing_rows(5_000, 3)))
        }
    });

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(report.queries_planned, 2);
    assert_eq!(report.queries_harvested, 1);
    assert_eq!(report.failed_queries.len(), 1);
    assert_eq!(report.failed_queries[0].records_written, 0);
    assert!(report.failed_queries[0].query.contains("2024-01-01"));
    assert_eq!(report.records_written, 3);

    let contents = std::fs::read_to_string(&output).unwrap();
    for id in 5_000..5_003 {
        assert!(contents.contains(&format!("doc{}.htm", id)));
    }
    assert!(!contents.contains("doc100.htm"));
}

#[tokio::test]
async fn test_rowless_table_skips_only_its_page() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results.csv");
    let root = interval(date(2024, 5, 1), date(2024, 5, 31));

    let fetcher = ScriptedFetcher::new(|r: &Request| {
        if r.page == 2 {
            Ok(rowless_table_html(250))
        } else {
            Ok(results_html(250, &filing_rows(r.page * 100, 2)))
        }
    });

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, &output)
        .await
        .unwrap();

    assert_eq!(report.queries_harvested, 1);
    assert_eq!(report.page_skips.len(), 1);
    assert_eq!(report.page_skips[0].page, 2);
    assert_eq!(report.page_skips[0].kind, SkipKind::SurfaceAbsent);
    assert_eq!(report.records_written, 4);

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("doc100.htm"));
    assert!(contents.contains("doc300.htm"));
    assert!(contents.contains("doc301.htm"));
    assert!(!contents.contains("doc200.htm"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_write_failure_keeps_rows_already_written() {
    let output = std::path::Path::new("/dev/full");
    if !output.exists() {
        return;
    }

    let root = interval(date(2024, 6, 1), date(2024, 6, 30));
    let fetcher = uniform_fetcher(250, 100);

    let report = run_harvest(&fetcher, &endpoint(), criteria(), root, 2, output)
        .await
        .unwrap();

    assert_eq!(report.queries_harvested, 0);
    assert_eq!(report.failed_queries.len(), 1);
    assert!(report.records_written > 0);
    assert_eq!(report.failed_queries[0].records_written, report.records_written);
}
