//! `jobfan-dispatch` library crate.
//!
//! The two run phases (dispatch, completion wait), reporting, and the
//! orchestration tying them together. The binary entrypoint lives in
//! `main.rs`.

pub mod dispatch;
pub mod error;
pub mod report;
pub mod runner;
pub mod wait;

#[cfg(test)]
mod fake;
