/// Errors from the job-queue REST layer.
///
/// Every failure of a remote call is one of these; callers do not retry.
#[derive(Debug, thiserror::Error)]
pub enum JobQueueError {
    /// The configured base URL cannot have paths appended to it.
    #[error("Invalid API base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, or
    /// an undecodable body).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Job queue API error ({status} {reason}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty if unknown.
        reason: String,
        /// Raw response body for debugging.
        body: String,
    },
}

impl JobQueueError {
    /// HTTP status code, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            JobQueueError::Status { status, .. } => Some(*status),
            JobQueueError::Request(e) => e.status().map(|s| s.as_u16()),
            JobQueueError::InvalidBaseUrl(_) => None,
        }
    }
}
