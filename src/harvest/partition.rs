//! Recursive date-range partitioning
//!
//! The source reports at most [`RESULT_CAP`] matches per query. A saturated
//! interval is split and each piece counted again until every accepted query
//! counts below the cap. The recursion runs on an explicit work stack so long
//! historical ranges do not deepen the call stack.

use crate::fetcher::{PageFetcher, ResultsPage};
use crate::harvest::report::{CoverageGap, GapReason};
use crate::query::{Query, SearchEndpoint};
use crate::{HarvestError, DEFAULT_BATCHES_NUMBER, RESULT_CAP};

/// Finalized queries plus any intervals that could not be fully covered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionPlan {
    /// Non-overlapping queries in chronological order
    pub queries: Vec<Query>,

    /// Intervals that were skipped or remain over the cap
    pub gaps: Vec<CoverageGap>,
}

/// One interval awaiting a count
struct Pending {
    query: Query,
    depth: u32,
}

/// Splits a query's date range until every piece fits under the cap
pub struct Partitioner<'a> {
    fetcher: &'a dyn PageFetcher,
    endpoint: &'a SearchEndpoint,
    batches: usize,
}

impl<'a> Partitioner<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, endpoint: &'a SearchEndpoint) -> Self {
        Self {
            fetcher,
            endpoint,
            batches: DEFAULT_BATCHES_NUMBER,
        }
    }

    /// Sets how many pieces a saturated interval is split into (at least 2)
    pub fn with_batches(mut self, batches: usize) -> Self {
        self.batches = batches.max(2);
        self
    }

    /// Partitions `root` into queries that each count below the cap
    ///
    /// # Failure policy
    ///
    /// | Condition | Root interval | Sub-interval |
    /// |-----------|---------------|--------------|
    /// | Verification exhausted | Error | Gap, subtree abandoned |
    /// | Other fetch failure | Error | Gap, skipped |
    /// | Unreadable count | Error | Count assumed to be the cap |
    /// | Single day at the cap | Accepted + gap | Accepted + gap |
    ///
    /// # Returns
    ///
    /// * `Ok(PartitionPlan)` - Finalized queries and coverage gaps
    /// * `Err(HarvestError)` - The root interval could not be counted
    pub async fn partition(&self, root: Query) -> Result<PartitionPlan, HarvestError> {
        let mut plan = PartitionPlan::default();
        let mut stack = vec![Pending {
            query: root,
            depth: 0,
        }];

        while let Some(Pending { query, depth }) = stack.pop() {
            let interval = query.interval();
            tracing::debug!("Counting results for {}", interval);

            let count = match fetch_count(self.fetcher, self.endpoint, &query).await {
                Ok(count) => count,
                Err(e) if depth == 0 => {
                    tracing::error!("Failed to count {}, aborting: {}", interval, e);
                    return Err(e);
                }
                Err(HarvestError::CountParse(e)) => {
                    tracing::warn!(
                        "Assuming {} results for {} after unreadable count on a non-empty page: {}",
                        RESULT_CAP,
                        interval,
                        e
                    );
                    RESULT_CAP
                }
                Err(HarvestError::Fetch(e)) if e.is_verification_exhausted() => {
                    tracing::error!("Giving up on {}: {}", interval, e);
                    plan.gaps.push(CoverageGap::new(
                        interval,
                        GapReason::VerificationExhausted {
                            message: e.to_string(),
                        },
                    ));
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping {} after unexpected error: {}", interval, e);
                    plan.gaps.push(CoverageGap::new(
                        interval,
                        GapReason::Skipped {
                            message: e.to_string(),
                        },
                    ));
                    continue;
                }
            };

            if count < RESULT_CAP {
                tracing::info!("{} results for {}, accepting query", count, interval);
                plan.queries.push(query);
                continue;
            }

            if interval.is_single_day() {
                tracing::warn!(
                    "{} reports {} results on a single day; only the first {} can be harvested",
                    interval.start(),
                    count,
                    RESULT_CAP
                );
                plan.gaps
                    .push(CoverageGap::new(interval, GapReason::SaturatedDay { count }));
                plan.queries.push(query);
                continue;
            }

            let batches = self.batches.min(interval.num_days() as usize);
            let pieces = interval.split(batches);
            tracing::info!(
                "{} results or more for {}, splitting in {} intervals",
                RESULT_CAP,
                interval,
                pieces.len()
            );

            // Reverse so the earliest piece is counted first
            for piece in pieces.into_iter().rev() {
                stack.push(Pending {
                    query: query.narrowed(piece),
                    depth: depth + 1,
                });
            }
        }

        tracing::info!(
            "Generated {} search requests ({} coverage gaps)",
            plan.queries.len(),
            plan.gaps.len()
        );

        Ok(plan)
    }
}

/// Fetches page 1 of `query` and reads its displayed result count
pub(crate) async fn fetch_count(
    fetcher: &dyn PageFetcher,
    endpoint: &SearchEndpoint,
    query: &Query,
) -> Result<u64, HarvestError> {
    let url = endpoint.url_for(query, 1);
    let page = fetcher.fetch_verified(&url, &ResultsPage::is_loaded).await?;
    Ok(page.result_count()?)
}
