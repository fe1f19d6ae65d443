//! In-process fake of the job-queue REST service.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use jobfan_core::config::DispatchConfig;

#[derive(Default)]
pub struct FakeService {
    pub item_count: usize,
    pub list_fails: bool,
    /// Item ids whose create call answers HTTP 500.
    pub failing_items: HashSet<String>,
    /// Job ids that report `running` forever.
    pub stuck_jobs: HashSet<String>,
    pub create_delay: Duration,
    pub creates: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub creates_in_flight: AtomicUsize,
    pub peak_creates: AtomicUsize,
}

impl FakeService {
    pub fn with_items(item_count: usize) -> Self {
        Self {
            item_count,
            ..Default::default()
        }
    }

    pub fn peak_creates(&self) -> usize {
        self.peak_creates.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

async fn list_deals(State(svc): State<Arc<FakeService>>) -> Response {
    if svc.list_fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "list unavailable").into_response();
    }
    let deals: Vec<_> = (1..=svc.item_count)
        .map(|i| json!({ "id": i, "name": format!("Deal {i}") }))
        .collect();
    Json(json!({ "data": deals })).into_response()
}

async fn analyze(State(svc): State<Arc<FakeService>>, Path(id): Path<String>) -> Response {
    svc.creates.fetch_add(1, Ordering::SeqCst);
    let now = svc.creates_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    svc.peak_creates.fetch_max(now, Ordering::SeqCst);
    tokio::time::sleep(svc.create_delay).await;
    svc.creates_in_flight.fetch_sub(1, Ordering::SeqCst);

    if svc.failing_items.contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "analysis backend down").into_response();
    }
    (
        StatusCode::ACCEPTED,
        Json(json!({ "job_id": format!("job-{id}"), "status": "queued" })),
    )
        .into_response()
}

async fn job(State(svc): State<Arc<FakeService>>, Path(job_id): Path<String>) -> Response {
    svc.status_calls.fetch_add(1, Ordering::SeqCst);
    let status = if svc.stuck_jobs.contains(&job_id) {
        "running"
    } else {
        "succeeded"
    };
    Json(json!({ "job_id": job_id, "status": status, "type": "deal_analysis" })).into_response()
}

/// Serve `svc` on an ephemeral port and return its `/api/v1` base URL.
pub async fn serve(svc: Arc<FakeService>) -> String {
    let app = Router::new()
        .route("/api/v1/deals", get(list_deals))
        .route("/api/v1/deals/{id}/analyze", post(analyze))
        .route("/api/v1/jobs/{job_id}", get(job))
        .with_state(svc);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

/// Build a config as if loaded from `vars`.
pub fn config(base_url: &str, vars: &[(&str, &str)]) -> DispatchConfig {
    let mut vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert("API_BASE_URL".into(), base_url.into());
    DispatchConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}
