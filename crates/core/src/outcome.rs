//! Per-item and per-job results collected during a run.
//!
//! Outcomes are created once, when the corresponding remote call (or
//! poll loop) resolves, and are only ever read afterwards for reporting.

use std::fmt;

use serde::Serialize;

use crate::types::{display_label, JobId, WorkItem, DRY_RUN_JOB_ID};

/// Result of submitting one [`WorkItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    pub item_id: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub result: DispatchResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchResult {
    /// The service accepted the job (or dry-run synthesized it).
    Submitted { job_id: JobId, status: String },
    /// Local validation or the create-job call failed.
    Failed { error: String },
}

impl DispatchOutcome {
    pub fn submitted(item: &WorkItem, job_id: impl Into<JobId>, status: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            result: DispatchResult::Submitted {
                job_id: job_id.into(),
                status: status.into(),
            },
        }
    }

    pub fn failed(item: &WorkItem, error: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            result: DispatchResult::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.result, DispatchResult::Submitted { .. })
    }

    pub fn job_id(&self) -> Option<&str> {
        match &self.result {
            DispatchResult::Submitted { job_id, .. } => Some(job_id),
            DispatchResult::Failed { .. } => None,
        }
    }

    /// Job id worth polling: submitted, and not the dry-run sentinel.
    pub fn pollable_job_id(&self) -> Option<&str> {
        self.job_id().filter(|id| *id != DRY_RUN_JOB_ID)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            DispatchResult::Failed { error } => Some(error),
            DispatchResult::Submitted { .. } => None,
        }
    }

    pub fn label(&self) -> &str {
        display_label(&self.item_id, self.name.as_deref())
    }
}

/// Final state of one polled job.
///
/// The first three mirror the remote terminal set; `Timeout` and `Error`
/// are synthesized locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Succeeded,
    Failed,
    Cancelled,
    Timeout,
    Error,
}

impl PollStatus {
    pub const ALL: [PollStatus; 5] = [
        PollStatus::Succeeded,
        PollStatus::Failed,
        PollStatus::Cancelled,
        PollStatus::Timeout,
        PollStatus::Error,
    ];

    /// Map a remote status string to its terminal variant, if it is one.
    ///
    /// This is the terminal set agreed with the job-queue service; the
    /// comparison is case-sensitive.
    pub fn from_terminal(status: &str) -> Option<Self> {
        match status {
            "succeeded" => Some(PollStatus::Succeeded),
            "failed" => Some(PollStatus::Failed),
            "cancelled" => Some(PollStatus::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Succeeded => "succeeded",
            PollStatus::Failed => "failed",
            PollStatus::Cancelled => "cancelled",
            PollStatus::Timeout => "timeout",
            PollStatus::Error => "error",
        }
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOutcome {
    pub job_id: JobId,
    pub item_id: String,
    pub name: Option<String>,
    pub status: PollStatus,
    /// Last non-terminal remote status seen (useful for timeouts).
    pub last_status: Option<String>,
    /// Remote message, or the transport error text for [`PollStatus::Error`].
    pub message: Option<String>,
    pub progress_pct: Option<f64>,
    /// Number of status calls issued for this job.
    pub polls: u32,
}

impl PollOutcome {
    pub fn label(&self) -> &str {
        display_label(&self.item_id, self.name.as_deref())
    }
}
