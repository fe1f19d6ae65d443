//! Bounded-parallelism admission gate for asynchronous operations.
//!
//! A [`ConcurrencyLimiter`] admits at most `concurrency` operations at a
//! time. Excess callers wait in a FIFO queue (the tokio [`Semaphore`] is
//! fair) and are admitted one by one as running operations finish.
//!
//! The admission slot is an RAII guard, so it is returned when the
//! operation completes, fails, or its future is dropped mid-flight.
//!
//! Each run creates one limiter per phase; instances share no state.
//!
//! ```ignore
//! let limiter = ConcurrencyLimiter::new(4, "dispatch")?;
//! let job = limiter.limit(|| queue.create_job(&item.id)).await?;
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::LimiterError;

#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    concurrency: usize,
    /// Operations currently admitted.
    in_flight: AtomicUsize,
    /// Highest `in_flight` observed since construction.
    peak_in_flight: AtomicUsize,
    /// Label for logging, e.g. "dispatch" or "poll".
    label: String,
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting at most `concurrency` operations.
    ///
    /// Returns [`LimiterError::ZeroConcurrency`] if `concurrency` is 0.
    pub fn new(concurrency: usize, label: impl Into<String>) -> Result<Self, LimiterError> {
        let label = label.into();
        if concurrency == 0 {
            return Err(LimiterError::ZeroConcurrency { label });
        }

        Ok(Self {
            semaphore: Semaphore::new(concurrency),
            concurrency,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            label,
        })
    }

    /// Run `operation` once a slot is free and return its output.
    ///
    /// The operation is not started until admission. Its output, including
    /// any `Err` it produces, is passed through untouched; the outer
    /// `Result` only reports a closed limiter.
    pub async fn limit<F, Fut, T>(&self, operation: F) -> Result<T, LimiterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _slot = self.acquire().await?;
        Ok(operation().await)
    }

    async fn acquire(&self) -> Result<Slot<'_>, LimiterError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LimiterError::Closed {
                label: self.label.clone(),
            })?;

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::Relaxed);
        tracing::trace!(limiter = %self.label, in_flight = current, "Operation admitted");

        Ok(Slot {
            _permit: permit,
            in_flight: &self.in_flight,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Admission slot. Dropping it releases the permit to the next waiter.
struct Slot<'a> {
    _permit: SemaphorePermit<'a>,
    in_flight: &'a AtomicUsize,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
