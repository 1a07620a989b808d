//! Harvest module: partitioning, pagination and output
//!
//! This module contains the core harvesting logic, including:
//! - Splitting a saturated date range into queries below the result cap
//! - Paginating each finalized query with per-page failure isolation
//! - Appending parsed records to the CSV destination
//! - Accounting for every skipped page and uncovered interval

mod paginate;
mod partition;
mod report;

pub use paginate::{page_count, parse_page, HarvestedPage, Harvester, PageCursor, PageError};
pub use partition::{PartitionPlan, Partitioner};
pub use report::{CoverageGap, FailedQuery, GapReason, HarvestReport, PageSkip, SkipKind};

use crate::config::Config;
use crate::fetcher::{Fetcher, PageFetcher};
use crate::output::CsvSink;
use crate::query::{DateInterval, Query, SearchCriteria, SearchEndpoint};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;

/// Runs a complete harvest with the fetcher described by `config`
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(HarvestReport)` - The harvest ran; the report lists any gaps
/// * `Err(HarvestError)` - The fetcher could not start or the root count was unreadable
pub async fn harvest(config: &Config) -> Result<HarvestReport, HarvestError> {
    let interval = config.interval()?;
    let fetcher = Fetcher::connect(config).await?;
    let endpoint = config.endpoint();

    let result = run_harvest(
        &fetcher,
        &endpoint,
        config.criteria(),
        interval,
        config.partition.batches,
        Path::new(&config.output.csv_path),
    )
    .await;

    fetcher.close().await;
    result
}

/// Partitions, paginates and writes every record matching `criteria`
///
/// This is the main harvest loop. It will:
/// 1. Partition `interval` into queries below the result cap
/// 2. Open each finalized query and read its page count
/// 3. Fetch and parse every page, skipping pages that fail
/// 4. Append each query's records to `output`, opening and closing it per query
///
/// Failures below the root count are logged and recorded in the report;
/// they never stop the harvest.
pub async fn run_harvest(
    fetcher: &dyn PageFetcher,
    endpoint: &SearchEndpoint,
    criteria: SearchCriteria,
    interval: DateInterval,
    batches: usize,
    output: &Path,
) -> Result<HarvestReport, HarvestError> {
    tracing::info!("Starting harvest for {}", interval);

    let root = Query::new(Arc::new(criteria), interval);
    let plan = Partitioner::new(fetcher, endpoint)
        .with_batches(batches)
        .partition(root)
        .await?;

    let mut report = HarvestReport::new(interval);
    report.queries_planned = plan.queries.len();
    report.coverage_gaps = plan.gaps;

    let harvester = Harvester::new(fetcher, endpoint);
    let start_time = std::time::Instant::now();

    for (i, query) in plan.queries.iter().enumerate() {
        tracing::info!(
            "Harvesting query {}/{}: {}",
            i + 1,
            report.queries_planned,
            query
        );

        let mut written = 0;
        match harvest_query(&harvester, query, output, &mut report, &mut written).await {
            Ok(()) => report.queries_harvested += 1,
            Err(e) => {
                tracing::warn!(
                    "Unexpected error while harvesting {} after {} records, skipping: {}",
                    query,
                    written,
                    e
                );
                report.failed_queries.push(FailedQuery {
                    query: query.to_string(),
                    message: e.to_string(),
                    records_written: written,
                });
            }
        }
        report.records_written += written;
    }

    tracing::info!(
        "Harvest completed: {} records from {}/{} queries in {:?}",
        report.records_written,
        report.queries_harvested,
        report.queries_planned,
        start_time.elapsed()
    );

    Ok(report)
}

/// Drains one query's pages into the destination
///
/// `written` tracks rows appended so far, including when an error cuts the
/// query short.
async fn harvest_query(
    harvester: &Harvester<'_>,
    query: &Query,
    output: &Path,
    report: &mut HarvestReport,
    written: &mut u64,
) -> Result<(), HarvestError> {
    let mut cursor = harvester.open(query).await?;
    let mut sink = CsvSink::open(output)?;

    while let Some(page) = cursor.next_page().await {
        match page.outcome {
            Ok(records) => {
                let result = sink.write_all(&records);
                *written = sink.written();
                result?;
                tracing::debug!("Wrote {} records from page {}", records.len(), page.number);
            }
            Err(e) => {
                tracing::warn!(
                    "Skipping page {}/{} of {} ({}): {}",
                    page.number,
                    cursor.num_pages(),
                    query,
                    e.kind(),
                    e
                );
                report.page_skips.push(PageSkip {
                    query: query.to_string(),
                    page: page.number,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    sink.close()?;
    tracing::info!("Wrote {} records for {} to {}", written, query, output.display());
    Ok(())
}
