//! Schedule state and status snapshots
//!
//! The scheduler loop is the only writer. Readers get whole-value clones out
//! of a `watch` channel, so a snapshot is never torn.

use crate::cycle::SyncResult;
use chrono::{DateTime, Local};
use std::fmt;
use tokio::sync::watch;

/// Classification of the most recent cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Every task written
    Success,
    /// Some tasks failed
    Partial,
    /// The cycle aborted
    Failure,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Partial => write!(f, "partial"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome of the most recent cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastOutcome {
    /// Classification
    pub status: OutcomeStatus,
    /// One-line summary (error text on failure)
    pub summary: String,
    /// Notes written
    pub written: usize,
    /// Per-task errors
    pub errors: usize,
}

impl From<&SyncResult> for LastOutcome {
    fn from(result: &SyncResult) -> Self {
        let status = if result.failure.is_some() {
            OutcomeStatus::Failure
        } else if result.errors.is_empty() {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::Partial
        };
        Self {
            status,
            summary: result.summary(),
            written: result.written,
            errors: result.errors.len(),
        }
    }
}

/// Scheduler state; in memory only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleState {
    /// Start of the most recent cycle
    pub last_run: Option<DateTime<Local>>,
    /// End of the most recent cycle
    pub last_finished: Option<DateTime<Local>>,
    /// When the next cycle is due
    pub next_run: Option<DateTime<Local>>,
    /// Completed cycles
    pub run_count: u64,
    /// Cycles that did not fully succeed
    pub failure_count: u64,
    /// Outcome of the most recent cycle
    pub last_outcome: Option<LastOutcome>,
    /// A cycle is executing
    pub running: bool,
    /// The loop has exited
    pub stopped: bool,
}

/// Read-only view of the scheduler state
#[derive(Debug, Clone)]
pub struct StatusHandle {
    rx: watch::Receiver<ScheduleState>,
}

impl StatusHandle {
    pub(crate) fn new(rx: watch::Receiver<ScheduleState>) -> Self {
        Self { rx }
    }

    /// Atomic copy of the current state
    pub fn snapshot(&self) -> ScheduleState {
        self.rx.borrow().clone()
    }

    /// Wait for the next update; `false` once the scheduler is gone
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
