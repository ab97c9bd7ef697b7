//! Timing policy
//!
//! Interval mode is anchored on cycle starts: the next cycle is due one
//! interval after the previous one started, or immediately if that moment has
//! already passed. Missed ticks are never replayed.
//!
//! Daily mode targets the next local occurrence of `HH:MM` strictly after
//! now. A wall time skipped by a DST transition moves to the following day.

use crate::error::TimingError;
use chrono::{DateTime, Days, LocalResult, NaiveTime, TimeZone};
use std::time::Duration;
use tokio::time::Instant;

/// Days searched for a valid daily occurrence
pub const DAILY_SEARCH_DAYS: u64 = 2;

/// Deadline for the next interval cycle
///
/// `started` is when the previous cycle started; `now` is after it finished.
pub fn next_interval_deadline(
    started: Instant,
    interval: Duration,
    now: Instant,
) -> Result<Instant, TimingError> {
    let due = started
        .checked_add(interval)
        .ok_or(TimingError::OutOfRange)?;
    Ok(due.max(now))
}

/// Next occurrence of `at` strictly after `now`, in `now`'s time zone
pub fn next_daily_run<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..=DAILY_SEARCH_DAYS).find_map(|offset| {
        let date = today.checked_add_days(Days::new(offset))?;
        let candidate = match tz.from_local_datetime(&date.and_time(at)) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, latest) => {
                if earliest > *now {
                    earliest
                } else {
                    latest
                }
            }
            LocalResult::None => return None,
        };
        (candidate > *now).then_some(candidate)
    })
}

/// Like [`next_daily_run`], but an error when nothing is found
pub fn require_next_daily_run<Tz: TimeZone>(
    now: &DateTime<Tz>,
    at: NaiveTime,
) -> Result<DateTime<Tz>, TimingError>
where
    Tz::Offset: std::fmt::Display,
{
    next_daily_run(now, at).ok_or_else(|| TimingError::NoOccurrence {
        time: at,
        days: DAILY_SEARCH_DAYS,
        after: now.to_rfc3339(),
    })
}
