use jobfan_client::JobQueueError;
use jobfan_core::error::LimiterError;

/// Failures that abort a whole run before or between phases.
///
/// Per-item and per-job failures never surface here; they are recorded
/// in the outcome collections instead.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Failed to fetch work items")]
    ListItems(#[source] JobQueueError),

    #[error(transparent)]
    Limiter(#[from] LimiterError),
}
