//! REST client for the job-queue service.
//!
//! Wraps the three endpoints the dispatcher consumes (item listing, job
//! creation, job status) using [`reqwest`]. Paths are resolved relative
//! to a base URL that carries any API prefix, e.g.
//! `http://host:3000/api/v1`.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use jobfan_core::config::DispatchConfig;
use jobfan_core::types::{CreatedJob, JobStatusRecord, WorkItem};

use crate::error::JobQueueError;
use crate::queue::JobQueue;

/// HTTP client for a single job-queue service.
#[derive(Debug, Clone)]
pub struct JobQueueClient {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

/// Responses may come bare or wrapped in a `{ "data": ... }` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

impl JobQueueClient {
    /// Create a client with a default [`reqwest::Client`] and no auth.
    pub fn new(api_url: &str) -> Result<Self, JobQueueError> {
        Self::with_client(reqwest::Client::new(), api_url, None)
    }

    /// Create a client from dispatcher configuration, applying the
    /// per-request timeout and optional bearer token.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, JobQueueError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, &config.api_base_url, config.api_token.clone())
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: &str,
        api_token: Option<String>,
    ) -> Result<Self, JobQueueError> {
        let base_url =
            Url::parse(api_url).map_err(|_| JobQueueError::InvalidBaseUrl(api_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(JobQueueError::InvalidBaseUrl(api_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            api_token,
        })
    }

    // ---- private helpers ----

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, JobQueueError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| JobQueueError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a body-less request. None of the endpoints take a request
    /// body, so no `Content-Type` header is ever attached.
    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response, JobQueueError> {
        tracing::debug!(%method, %url, "Job queue request");

        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        Ok(request.send().await?)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`JobQueueError::Status`]
    /// carrying the status, reason and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, JobQueueError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JobQueueError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body, with or without envelope.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, JobQueueError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Envelope<T>>().await?.into_inner())
    }
}

#[async_trait]
impl JobQueue for JobQueueClient {
    /// `GET {base}/deals`
    async fn list_items(&self) -> Result<Vec<WorkItem>, JobQueueError> {
        let url = self.endpoint(&["deals"])?;
        let response = self.send(Method::GET, url).await?;
        Self::parse_response(response).await
    }

    /// `POST {base}/deals/{id}/analyze`
    async fn create_job(&self, item_id: &str) -> Result<CreatedJob, JobQueueError> {
        let url = self.endpoint(&["deals", item_id, "analyze"])?;
        let response = self.send(Method::POST, url).await?;
        Self::parse_response(response).await
    }

    /// `GET {base}/jobs/{job_id}`
    async fn job_status(&self, job_id: &str) -> Result<JobStatusRecord, JobQueueError> {
        let url = self.endpoint(&["jobs", job_id])?;
        let response = self.send(Method::GET, url).await?;
        Self::parse_response(response).await
    }
}
