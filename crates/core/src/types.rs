//! Records exchanged with the remote job-queue service.

use serde::{Deserialize, Deserializer, Serialize};

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Handle to a job record owned by the remote job-queue service.
pub type JobId = String;

/// Job id synthesized for dispatches made in dry-run mode. Never polled.
pub const DRY_RUN_JOB_ID: &str = "dry-run";

/// Human-readable label for an item: its display name if non-empty, else its id.
pub fn display_label<'a>(id: &'a str, name: Option<&'a str>) -> &'a str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => id,
    }
}

/// One unit of input to submit as a remote job (e.g. one deal to re-analyze).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Opaque identifier. Empty when the service sent none.
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// Response of the create-job endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedJob {
    #[serde(deserialize_with = "id_as_string")]
    pub job_id: JobId,
    #[serde(default)]
    pub status: String,
}

/// Response of the job-status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    #[serde(default, deserialize_with = "id_as_string")]
    pub job_id: JobId,
    /// Free-form remote status, e.g. `queued`, `running`, `succeeded`.
    pub status: String,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub progress_pct: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Identifiers arrive as JSON strings or integers depending on the
/// service's storage; normalise both to `String`.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_id_as_string(deserializer)?.unwrap_or_default())
}

fn opt_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
