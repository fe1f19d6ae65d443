//! Core types for the `jobfan` batch job dispatcher.
//!
//! Holds the wire-level domain types shared with the remote job-queue
//! service, the per-item and per-job outcome records, environment-driven
//! configuration, and the FIFO [`limiter::ConcurrencyLimiter`] that both
//! run phases use to bound their fan-out.

pub mod config;
pub mod error;
pub mod limiter;
pub mod outcome;
pub mod types;
