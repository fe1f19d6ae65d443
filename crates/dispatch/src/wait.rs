//! Completion-wait phase: poll each created job until it settles.
//!
//! Every job's whole watch loop runs inside the poll
//! [`ConcurrencyLimiter`], so at most `poll_concurrency` jobs are being
//! watched at once. A job settles when the service reports a terminal
//! status, when its deadline passes (`timeout`), or on the first
//! transport failure (`error`). None of these affect sibling jobs.

use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;

use jobfan_client::JobQueue;
use jobfan_core::config::DispatchConfig;
use jobfan_core::limiter::ConcurrencyLimiter;
use jobfan_core::outcome::{DispatchOutcome, PollOutcome, PollStatus};
use jobfan_core::types::JobStatusRecord;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Delay between two status calls for the same job.
    pub interval: Duration,
    /// Per-job wall-clock deadline, measured from the first call.
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &DispatchConfig) -> Self {
        Self {
            interval: config.poll_interval,
            timeout: config.poll_timeout,
        }
    }
}

/// Watch every pollable job among `dispatched`.
///
/// Failed dispatches and dry-run sentinels are skipped. Returns one
/// outcome per watched job, in dispatch order.
pub async fn wait_all<Q>(
    queue: &Q,
    dispatched: &[DispatchOutcome],
    limiter: &ConcurrencyLimiter,
    settings: PollSettings,
) -> Vec<PollOutcome>
where
    Q: JobQueue + ?Sized,
{
    let watches = dispatched
        .iter()
        .filter_map(|source| source.pollable_job_id().map(|job_id| (source, job_id)))
        .map(|(source, job_id)| async move {
            limiter
                .limit(|| watch_job(queue, source, job_id, settings))
                .await
                .unwrap_or_else(|e| PollTracker::new(source, job_id).error(e.to_string()))
        });

    join_all(watches).await
}

/// Poll one job until it reaches a terminal status, times out, or a
/// status call fails.
pub async fn watch_job<Q>(
    queue: &Q,
    source: &DispatchOutcome,
    job_id: &str,
    settings: PollSettings,
) -> PollOutcome
where
    Q: JobQueue + ?Sized,
{
    let started = Instant::now();
    let mut tracker = PollTracker::new(source, job_id);

    while started.elapsed() < settings.timeout {
        tracker.polls += 1;

        let record = match queue.job_status(job_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(job_id, polls = tracker.polls, error = %e, "Status check failed");
                return tracker.error(e.to_string());
            }
        };

        if let Some(status) = PollStatus::from_terminal(&record.status) {
            tracing::info!(
                job_id,
                item = %source.label(),
                %status,
                polls = tracker.polls,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Job finished",
            );
            return tracker.finish(status, record);
        }

        tracing::debug!(
            job_id,
            status = %record.status,
            progress_pct = record.progress_pct,
            "Job still running",
        );
        tracker.last = Some(record);

        tokio::time::sleep(settings.interval).await;
    }

    tracing::warn!(
        job_id,
        item = %source.label(),
        polls = tracker.polls,
        timeout_ms = settings.timeout.as_millis() as u64,
        "Job did not finish before deadline",
    );
    tracker.timeout()
}

/// Accumulates what one watch loop has seen so far.
struct PollTracker<'a> {
    source: &'a DispatchOutcome,
    job_id: &'a str,
    polls: u32,
    last: Option<JobStatusRecord>,
}

impl<'a> PollTracker<'a> {
    fn new(source: &'a DispatchOutcome, job_id: &'a str) -> Self {
        Self {
            source,
            job_id,
            polls: 0,
            last: None,
        }
    }

    fn outcome(&self, status: PollStatus, record: Option<&JobStatusRecord>) -> PollOutcome {
        PollOutcome {
            job_id: self.job_id.to_string(),
            item_id: self.source.item_id.clone(),
            name: self.source.name.clone(),
            status,
            last_status: record.map(|r| r.status.clone()),
            message: record.and_then(|r| r.message.clone()),
            progress_pct: record.and_then(|r| r.progress_pct),
            polls: self.polls,
        }
    }

    fn finish(self, status: PollStatus, record: JobStatusRecord) -> PollOutcome {
        self.outcome(status, Some(&record))
    }

    fn timeout(self) -> PollOutcome {
        self.outcome(PollStatus::Timeout, self.last.as_ref())
    }

    fn error(self, error: String) -> PollOutcome {
        PollOutcome {
            message: Some(error),
            ..self.outcome(PollStatus::Error, self.last.as_ref())
        }
    }
}
