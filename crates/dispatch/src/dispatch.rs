//! Dispatch phase: submit every work item as a remote job.
//!
//! Each item goes through the dispatch [`ConcurrencyLimiter`] and issues
//! exactly one create-job call. Failures are captured as
//! [`DispatchOutcome`]s rather than returned, so one bad item never
//! aborts the batch.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::future::join_all;

use jobfan_client::JobQueue;
use jobfan_core::limiter::ConcurrencyLimiter;
use jobfan_core::outcome::DispatchOutcome;
use jobfan_core::types::{WorkItem, DRY_RUN_JOB_ID};

/// Status recorded for dry-run submissions.
pub const DRY_RUN_STATUS: &str = "dry_run";

/// Submit all `items`, at most `limiter.concurrency()` at a time.
///
/// Returns one outcome per input item, in input order. With `dry_run`
/// set no create-job call is made and every valid item gets the
/// [`DRY_RUN_JOB_ID`] sentinel.
pub async fn dispatch_all<Q>(
    queue: &Q,
    items: &[WorkItem],
    limiter: &ConcurrencyLimiter,
    dry_run: bool,
) -> Vec<DispatchOutcome>
where
    Q: JobQueue + ?Sized,
{
    let total = items.len();
    let done = AtomicUsize::new(0);
    let done = &done;

    let submissions = items.iter().map(|item| async move {
        let outcome = dispatch_one(queue, item, limiter, dry_run).await;
        let resolved = done.fetch_add(1, Ordering::Relaxed) + 1;

        match (outcome.job_id(), outcome.error()) {
            (Some(job_id), _) => tracing::info!(
                item = %outcome.label(),
                job_id,
                resolved,
                total,
                "Job submitted",
            ),
            (None, error) => tracing::warn!(
                item = %outcome.label(),
                error = error.unwrap_or_default(),
                resolved,
                total,
                "Job submission failed",
            ),
        }

        outcome
    });

    join_all(submissions).await
}

async fn dispatch_one<Q>(
    queue: &Q,
    item: &WorkItem,
    limiter: &ConcurrencyLimiter,
    dry_run: bool,
) -> DispatchOutcome
where
    Q: JobQueue + ?Sized,
{
    if item.id.trim().is_empty() {
        return DispatchOutcome::failed(item, "missing item id");
    }

    let admitted = limiter
        .limit(|| async {
            if dry_run {
                return DispatchOutcome::submitted(item, DRY_RUN_JOB_ID, DRY_RUN_STATUS);
            }
            match queue.create_job(&item.id).await {
                Ok(job) if job.job_id.is_empty() => {
                    DispatchOutcome::failed(item, "service returned no job id")
                }
                Ok(job) => DispatchOutcome::submitted(item, job.job_id, job.status),
                Err(e) => DispatchOutcome::failed(item, e.to_string()),
            }
        })
        .await;

    admitted.unwrap_or_else(|e| DispatchOutcome::failed(item, e.to_string()))
}
