//! Client for the remote job-queue REST service.
//!
//! [`queue::JobQueue`] is the seam the dispatcher drives; the reqwest
//! implementation lives in [`api`].

pub mod api;
pub mod error;
pub mod queue;

pub use api::JobQueueClient;
pub use error::JobQueueError;
pub use queue::JobQueue;
