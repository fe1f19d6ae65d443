//! End-of-phase aggregation over the outcome collections.
//!
//! Summaries are plain data: they implement [`Display`] for the console
//! report and [`Serialize`] for `OUTPUT_FORMAT=json`.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::Serialize;

use jobfan_core::outcome::{DispatchOutcome, PollOutcome, PollStatus};

#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    /// Every outcome that did not produce a job.
    pub failures: Vec<DispatchOutcome>,
}

impl DispatchSummary {
    pub fn from_outcomes(outcomes: &[DispatchOutcome]) -> Self {
        let failures: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).cloned().collect();
        Self {
            total: outcomes.len(),
            ok: outcomes.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }
}

impl Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dispatch: total={} ok={} failed={}",
            self.total, self.ok, self.failed
        )?;
        for outcome in &self.failures {
            writeln!(
                f,
                "  FAILED {} (id {}): {}",
                outcome.label(),
                outcome.item_id,
                outcome.error().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionSummary {
    pub total: usize,
    /// Count per category; every category is present, zeros included.
    pub counts: BTreeMap<PollStatus, usize>,
    /// Every outcome other than `succeeded`.
    pub unsuccessful: Vec<PollOutcome>,
}

impl CompletionSummary {
    pub fn from_outcomes(outcomes: &[PollOutcome]) -> Self {
        let mut counts: BTreeMap<PollStatus, usize> =
            PollStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for outcome in outcomes {
            *counts.entry(outcome.status).or_default() += 1;
        }

        Self {
            total: outcomes.len(),
            counts,
            unsuccessful: outcomes
                .iter()
                .filter(|o| o.status != PollStatus::Succeeded)
                .cloned()
                .collect(),
        }
    }

    pub fn count(&self, status: PollStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

impl Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Completion: total={}", self.total)?;
        for (status, count) in &self.counts {
            write!(f, " {status}={count}")?;
        }
        writeln!(f)?;

        for outcome in &self.unsuccessful {
            write!(
                f,
                "  {} {} (job {})",
                outcome.status.as_str().to_uppercase(),
                outcome.label(),
                outcome.job_id
            )?;
            if let Some(last) = outcome.last_status.as_deref() {
                write!(f, " last status {last}")?;
            }
            if let Some(message) = outcome.message.as_deref() {
                write!(f, ": {message}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything a run produced, for the final console or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub wait: bool,
    pub dispatch: DispatchSummary,
    /// `None` when wait mode is off or there was nothing to watch.
    pub completion: Option<CompletionSummary>,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "(dry run: no jobs were created)")?;
        }
        write!(f, "{}", self.dispatch)?;
        match &self.completion {
            Some(completion) => write!(f, "{completion}"),
            None if self.wait => writeln!(f, "Completion: skipped (no jobs to watch)"),
            None => Ok(()),
        }
    }
}
