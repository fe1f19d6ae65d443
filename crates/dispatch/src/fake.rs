//! In-memory [`JobQueue`] for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use jobfan_client::{JobQueue, JobQueueError};
use jobfan_core::types::{CreatedJob, JobStatusRecord, WorkItem};

#[derive(Clone, Copy)]
enum Scripted {
    Status(&'static str),
    Fail,
}

#[derive(Default)]
pub(crate) struct FakeQueue {
    items: Vec<WorkItem>,
    list_fails: bool,
    failing_creates: HashSet<String>,
    blank_job_ids: HashSet<String>,
    create_delay: Duration,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    pub create_calls: Mutex<Vec<String>>,
    pub status_calls: Mutex<Vec<(String, Instant)>>,
    creates_in_flight: AtomicUsize,
    pub peak_creates: AtomicUsize,
}

pub(crate) fn job_id_for(item_id: &str) -> String {
    format!("job-{item_id}")
}

fn server_error() -> JobQueueError {
    JobQueueError::Status {
        status: 500,
        reason: "Internal Server Error".into(),
        body: "boom".into(),
    }
}

impl FakeQueue {
    /// Items `"1"..="n"`, named `Deal i`.
    pub fn with_items(n: usize) -> Self {
        let items = (1..=n)
            .map(|i| WorkItem::new(i.to_string(), Some(format!("Deal {i}"))))
            .collect();
        Self::with_work(items)
    }

    pub fn with_work(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn list_fails(mut self) -> Self {
        self.list_fails = true;
        self
    }

    pub fn fail_create(mut self, item_id: &str) -> Self {
        self.failing_creates.insert(item_id.to_string());
        self
    }

    pub fn blank_job_id(mut self, item_id: &str) -> Self {
        self.blank_job_ids.insert(item_id.to_string());
        self
    }

    pub fn create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Status responses for `job_id`, in order. The last one repeats.
    /// Unscripted jobs report `succeeded`.
    pub fn script(self, job_id: &str, statuses: &[&'static str]) -> Self {
        let script = statuses.iter().map(|s| Scripted::Status(*s)).collect();
        self.scripts.lock().unwrap().insert(job_id.to_string(), script);
        self
    }

    /// Like [`FakeQueue::script`], then every later call fails.
    pub fn script_then_fail(self, job_id: &str, statuses: &[&'static str]) -> Self {
        let script = statuses
            .iter()
            .map(|s| Scripted::Status(*s))
            .chain([Scripted::Fail])
            .collect();
        self.scripts.lock().unwrap().insert(job_id.to_string(), script);
        self
    }

    pub fn fail_status(self, job_id: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(job_id.to_string(), VecDeque::from([Scripted::Fail]));
        self
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.lock().unwrap().len()
    }

    pub fn status_calls_for(&self, job_id: &str) -> Vec<Instant> {
        self.status_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == job_id)
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn list_items(&self) -> Result<Vec<WorkItem>, JobQueueError> {
        if self.list_fails {
            return Err(server_error());
        }
        Ok(self.items.clone())
    }

    async fn create_job(&self, item_id: &str) -> Result<CreatedJob, JobQueueError> {
        self.create_calls.lock().unwrap().push(item_id.to_string());
        let now = self.creates_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_creates.fetch_max(now, Ordering::SeqCst);

        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        self.creates_in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_creates.contains(item_id) {
            return Err(server_error());
        }
        let job_id = if self.blank_job_ids.contains(item_id) {
            String::new()
        } else {
            job_id_for(item_id)
        };
        Ok(CreatedJob {
            job_id,
            status: "queued".into(),
        })
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusRecord, JobQueueError> {
        self.status_calls
            .lock()
            .unwrap()
            .push((job_id.to_string(), Instant::now()));

        let status = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(job_id) {
                None => "succeeded",
                Some(script) => {
                    let next = if script.len() > 1 {
                        script.pop_front()
                    } else {
                        script.front().copied()
                    };
                    match next {
                        Some(Scripted::Status(s)) => s,
                        Some(Scripted::Fail) | None => return Err(server_error()),
                    }
                }
            }
        };

        Ok(JobStatusRecord {
            job_id: job_id.to_string(),
            status: status.to_string(),
            job_type: Some("deal_analysis".into()),
            deal_id: None,
            progress_pct: None,
            message: Some(format!("{status} message")),
            created_at: None,
            updated_at: None,
        })
    }
}
