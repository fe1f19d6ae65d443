use async_trait::async_trait;

use jobfan_core::types::{CreatedJob, JobStatusRecord, WorkItem};

use crate::error::JobQueueError;

/// The three remote operations the dispatcher needs.
///
/// Implementations must not retry internally; retry policy belongs to
/// the caller.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Fetch the full list of work items.
    async fn list_items(&self) -> Result<Vec<WorkItem>, JobQueueError>;

    /// Submit one item as a new remote job.
    async fn create_job(&self, item_id: &str) -> Result<CreatedJob, JobQueueError>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &str) -> Result<JobStatusRecord, JobQueueError>;
}
