//! One full run: list → dispatch → optional wait → report.

use jobfan_client::JobQueue;
use jobfan_core::config::DispatchConfig;
use jobfan_core::limiter::ConcurrencyLimiter;

use crate::dispatch::dispatch_all;
use crate::error::RunError;
use crate::report::{CompletionSummary, DispatchSummary, RunReport};
use crate::wait::{wait_all, PollSettings};

/// Execute both phases against `queue` and return the aggregated report.
///
/// Only a failed item listing or an unusable concurrency setting aborts
/// the run; both are checked before any job is submitted.
pub async fn run<Q>(queue: &Q, config: &DispatchConfig) -> Result<RunReport, RunError>
where
    Q: JobQueue + ?Sized,
{
    let dispatch_limiter = ConcurrencyLimiter::new(config.dispatch_concurrency, "dispatch")?;
    let poll_limiter = if config.wait {
        Some(ConcurrencyLimiter::new(config.poll_concurrency, "poll")?)
    } else {
        None
    };

    let mut items = queue.list_items().await.map_err(RunError::ListItems)?;
    let listed = items.len();
    if config.item_limit > 0 {
        items.truncate(config.item_limit);
    }
    tracing::info!(
        listed,
        selected = items.len(),
        dry_run = config.dry_run,
        concurrency = dispatch_limiter.concurrency(),
        "Dispatching work items",
    );

    let outcomes = dispatch_all(queue, &items, &dispatch_limiter, config.dry_run).await;
    let dispatch = DispatchSummary::from_outcomes(&outcomes);
    tracing::info!(
        total = dispatch.total,
        ok = dispatch.ok,
        failed = dispatch.failed,
        peak_in_flight = dispatch_limiter.peak_in_flight(),
        "Dispatch phase complete",
    );

    let completion = match poll_limiter {
        None => None,
        Some(_) if !outcomes.iter().any(|o| o.pollable_job_id().is_some()) => {
            tracing::info!("No jobs to wait for, skipping completion wait");
            None
        }
        Some(limiter) => {
            let settings = PollSettings::from_config(config);
            tracing::info!(
                concurrency = limiter.concurrency(),
                interval_ms = settings.interval.as_millis() as u64,
                timeout_ms = settings.timeout.as_millis() as u64,
                "Waiting for jobs to finish",
            );

            let polls = wait_all(queue, &outcomes, &limiter, settings).await;
            let summary = CompletionSummary::from_outcomes(&polls);
            tracing::info!(
                total = summary.total,
                unsuccessful = summary.unsuccessful.len(),
                peak_in_flight = limiter.peak_in_flight(),
                "Completion wait complete",
            );
            Some(summary)
        }
    };

    Ok(RunReport {
        dry_run: config.dry_run,
        wait: config.wait,
        dispatch,
        completion,
    })
}
