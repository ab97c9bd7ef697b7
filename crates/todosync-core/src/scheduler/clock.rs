//! Wall-clock source
//!
//! Waiting uses tokio's monotonic clock; the wall clock is only needed to
//! stamp state and to find the next daily occurrence.

use chrono::{DateTime, Local};

/// Source of the current local time
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
