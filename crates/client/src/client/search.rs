//! Query execution: job submission, polling, and result accumulation.

use std::time::Instant;
use tracing::{debug, warn};

use super::{CriblSearchClient, SEARCH_API_PREFIX};
use crate::backoff::FibonacciBackoff;
use crate::error::{ClientError, Result};
use crate::models::JOB_STATUS_COMPLETED;
use crate::query::{SearchQuery, TimeRange, prepare_query};
use crate::table::{ResultTable, TableBuilder};
use cribl_search_config::constants::MAX_RESULTS;

impl CriblSearchClient {
    /// Run a query to completion and return its results as a table.
    ///
    /// The first request submits the query; every request after that
    /// re-addresses the same job by id, so the pages of one run can never
    /// interleave with a different job's results. Polling backs off along a
    /// Fibonacci schedule while the job executes. At most [`MAX_RESULTS`]
    /// rows are collected; a query that is not runnable yet returns an empty
    /// table without touching the network.
    pub async fn run_query(&self, query: &SearchQuery, range: TimeRange) -> Result<ResultTable> {
        if !query.is_runnable() {
            debug!("query has nothing to run, returning empty table");
            return Ok(ResultTable::empty());
        }

        let mut base_params: Vec<(&str, String)> = match query {
            SearchQuery::Adhoc { query } => vec![
                ("query", prepare_query(query)),
                ("earliest", range.earliest.to_string()),
                ("latest", range.latest.to_string()),
            ],
            SearchQuery::Saved { saved_search_id } => {
                vec![("queryId", saved_search_id.clone())]
            }
        };

        let started = Instant::now();
        let mut backoff = FibonacciBackoff::default();
        let mut builder = TableBuilder::new();

        loop {
            let mut params = base_params.clone();
            params.push(("offset", builder.row_count().to_string()));
            params.push(("limit", MAX_RESULTS.to_string()));

            let body = self
                .get_raw(&format!("{SEARCH_API_PREFIX}/query"), &params)
                .await?;
            let page = super::transport::parse_ndjson(&body)?;

            let job = page.header.job.ok_or_else(|| {
                ClientError::InvalidResponse(
                    "query response header carries no job id".to_string(),
                )
            })?;
            // From here on, poll the job itself rather than resubmitting.
            base_params = vec![("jobId", job.id.clone())];

            if !page.header.is_finished {
                let elapsed = started.elapsed();
                if let Some(deadline) = self.query_timeout()
                    && elapsed >= deadline
                {
                    // The job keeps billing until it stops; cancellation is
                    // best effort since we are giving up either way.
                    if let Err(cancel_err) = self.cancel_job(&job.id).await {
                        warn!(job_id = %job.id, error = %cancel_err, "failed to cancel timed-out job");
                    }
                    return Err(ClientError::DeadlineExceeded {
                        job_id: job.id,
                        status: job.status,
                        elapsed,
                    });
                }
                let delay = backoff.next_delay();
                debug!(job_id = %job.id, status = %job.status, ?delay, "job still running");
                tokio::time::sleep(delay).await;
                continue;
            }

            if job.status != JOB_STATUS_COMPLETED {
                return Err(ClientError::JobFailed {
                    job_id: job.id,
                    status: job.status,
                });
            }

            let total = page.header.total_event_count.ok_or_else(|| {
                ClientError::InvalidResponse(
                    "finished job reported no total event count".to_string(),
                )
            })?;

            for event in &page.events {
                if builder.row_count() >= MAX_RESULTS {
                    break;
                }
                builder.add_event(event);
            }

            let rows = builder.row_count();
            if rows >= MAX_RESULTS || rows as u64 >= total {
                debug!(job_id = %job.id, rows, total, "query complete");
                return Ok(builder.finish());
            }
            debug!(job_id = %job.id, rows, total, "fetching next page");
        }
    }
}
