//! Sync Scheduler
//!
//! Repeats the [`SyncCycle`] according to a timing policy:
//!
//! - **Interval**: cycle starts are one interval apart; an overrunning cycle
//!   is followed immediately by the next one, missed ticks are dropped
//! - **Daily**: the next local occurrence of `HH:MM`, checked against the
//!   wall clock so a suspend or a clock step does not delay it
//! - **Once**: a single cycle, then a clean exit
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   watch    ┌──────────────┐
//! │    Scheduler    │──────────▶ │ StatusHandle │  snapshots for the panel
//! └────────┬────────┘            └──────────────┘
//!          │ one at a time
//!          ▼
//! ┌─────────────────┐
//! │    SyncCycle    │  fetch → render → write
//! └─────────────────┘
//! ```
//!
//! Between cycles the loop waits on `select!` over the deadline and the
//! shutdown token, so a stop request during a wait takes effect at once. A
//! cycle in flight is never interrupted.
//!
//! # Example
//!
//! ```ignore
//! let scheduler = Arc::new(Scheduler::new(cycle));
//! spawn_signal_listener(scheduler.shutdown_handle());
//!
//! match scheduler.start(&config).await {
//!     ExitOutcome::CleanShutdown => {}
//!     other => eprintln!("{:?}", other),
//! }
//! ```

mod clock;
mod state;
mod timing;

pub use clock::{Clock, SystemClock};
pub use state::{LastOutcome, OutcomeStatus, ScheduleState, StatusHandle};
pub use timing::{next_daily_run, next_interval_deadline, require_next_daily_run, DAILY_SEARCH_DAYS};

use crate::config::{check_interval, parse_time_of_day, SyncConfiguration, TimingMode};
use crate::cycle::{SyncCycle, SyncResult};
use crate::error::{ConfigError, TimingError};
use crate::shutdown::ShutdownHandle;
use chrono::{DateTime, Local, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use todosync_notes::prepare_output_root;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Longest single sleep while waiting for a daily run
const WALL_CLOCK_POLL: Duration = Duration::from_secs(1);

/// How the scheduler terminated
#[derive(Debug)]
pub enum ExitOutcome {
    /// Stopped on request, or after the single run
    CleanShutdown,
    /// Configuration rejected before any cycle
    FatalConfigError(ConfigError),
    /// Next run time could not be computed
    FatalTimingError(TimingError),
}

impl ExitOutcome {
    /// Whether the scheduler exited cleanly
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::CleanShutdown)
    }
}

/// Validated timing policy
#[derive(Debug, Clone, Copy)]
enum Policy {
    Interval(Duration),
    Daily(NaiveTime),
}

impl Policy {
    fn from_config(config: &SyncConfiguration) -> Result<Self, ConfigError> {
        match &config.timing {
            TimingMode::Interval(d) => check_interval(*d).map(|()| Self::Interval(*d)),
            TimingMode::Daily(at) => parse_time_of_day(at).map(Self::Daily),
        }
    }
}

/// A computed next run
#[derive(Debug, Clone, Copy)]
struct NextRun {
    /// Wall-clock time, shown in the status
    at: DateTime<Local>,
    /// Monotonic deadline; `None` when due once the wall clock reaches `at`
    deadline: Option<Instant>,
}

/// Drives repeated sync cycles
pub struct Scheduler {
    cycle: SyncCycle,
    clock: Arc<dyn Clock>,
    state: watch::Sender<ScheduleState>,
    shutdown: ShutdownHandle,
    cycle_lock: Mutex<()>,
}

impl Scheduler {
    /// Create a scheduler around a sync cycle
    pub fn new(cycle: SyncCycle) -> Self {
        let (state, _) = watch::channel(ScheduleState::default());
        Self {
            cycle,
            clock: Arc::new(SystemClock),
            state,
            shutdown: ShutdownHandle::new(),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Use a different wall clock, for the schedule and the cycle results
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cycle = self.cycle.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    /// Share an existing shutdown handle
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownHandle) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that stops the loop after the current cycle
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stop after the current cycle; idempotent
    pub fn request_shutdown(&self) {
        self.shutdown.request();
    }

    /// Read-only status view
    pub fn status(&self) -> StatusHandle {
        StatusHandle::new(self.state.subscribe())
    }

    /// Run exactly one cycle
    ///
    /// Task-level and fetch failures are inside the [`SyncResult`]; `Err` only
    /// for an invalid configuration or an unusable output directory.
    pub async fn run_once(&self, config: &SyncConfiguration) -> Result<SyncResult, ConfigError> {
        self.prepare(config).await?;
        Ok(self.run_cycle(config).await)
    }

    /// Run until shutdown is requested (or once, in single-run mode)
    pub async fn start(&self, config: &SyncConfiguration) -> ExitOutcome {
        let outcome = self.run_loop(config).await;

        self.state.send_modify(|s| {
            s.running = false;
            s.stopped = true;
            s.next_run = None;
        });

        match &outcome {
            ExitOutcome::CleanShutdown => info!("Scheduler stopped"),
            ExitOutcome::FatalConfigError(e) => error!("Scheduler refused to start: {}", e),
            ExitOutcome::FatalTimingError(e) => error!("Scheduler stopped: {}", e),
        }
        outcome
    }

    async fn prepare(&self, config: &SyncConfiguration) -> Result<(), ConfigError> {
        config.validate()?;
        prepare_output_root(&config.export.output_dir).await?;
        Ok(())
    }

    async fn run_loop(&self, config: &SyncConfiguration) -> ExitOutcome {
        if let Err(e) = self.prepare(config).await {
            return ExitOutcome::FatalConfigError(e);
        }

        if config.once {
            info!("Single-run mode");
            self.run_cycle(config).await;
            return ExitOutcome::CleanShutdown;
        }

        let policy = match Policy::from_config(config) {
            Ok(policy) => policy,
            Err(e) => return ExitOutcome::FatalConfigError(e),
        };

        info!(
            timing = %config.timing,
            output = %config.export.output_dir.display(),
            "Scheduler started"
        );

        let mut next = if config.run_immediately {
            NextRun {
                at: self.clock.now(),
                deadline: Some(Instant::now()),
            }
        } else {
            match self.first_run(policy) {
                Ok(next) => next,
                Err(e) => return ExitOutcome::FatalTimingError(e),
            }
        };

        loop {
            self.state.send_modify(|s| s.next_run = Some(next.at));
            debug!(next_run = %next.at.format("%Y-%m-%d %H:%M:%S"), "Waiting for next sync");

            tokio::select! {
                biased;
                _ = self.shutdown.requested() => {
                    info!("Shutting down scheduler");
                    break;
                }
                _ = self.wait_for(next) => {}
            }

            let started = Instant::now();
            self.run_cycle(config).await;

            next = match self.following_run(policy, started) {
                Ok(next) => next,
                Err(e) => return ExitOutcome::FatalTimingError(e),
            };
        }

        ExitOutcome::CleanShutdown
    }

    fn first_run(&self, policy: Policy) -> Result<NextRun, TimingError> {
        match policy {
            Policy::Interval(interval) => {
                let deadline = Instant::now()
                    .checked_add(interval)
                    .ok_or(TimingError::OutOfRange)?;
                self.after(deadline)
            }
            Policy::Daily(at) => self.daily_run(at),
        }
    }

    fn following_run(&self, policy: Policy, started: Instant) -> Result<NextRun, TimingError> {
        match policy {
            Policy::Interval(interval) => {
                let deadline = next_interval_deadline(started, interval, Instant::now())?;
                if deadline <= Instant::now() {
                    warn!(
                        interval_secs = interval.as_secs(),
                        "Sync took longer than the interval, starting next cycle immediately"
                    );
                }
                self.after(deadline)
            }
            Policy::Daily(at) => self.daily_run(at),
        }
    }

    fn daily_run(&self, at: NaiveTime) -> Result<NextRun, TimingError> {
        let now = self.clock.now();
        let target = require_next_daily_run(&now, at)?;
        Ok(NextRun {
            at: target,
            deadline: None,
        })
    }

    /// Pair a monotonic deadline with its wall-clock time
    fn after(&self, deadline: Instant) -> Result<NextRun, TimingError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let offset = chrono::Duration::from_std(remaining).map_err(|_| TimingError::OutOfRange)?;
        let at = self
            .clock
            .now()
            .checked_add_signed(offset)
            .ok_or(TimingError::OutOfRange)?;
        Ok(NextRun {
            at,
            deadline: Some(deadline),
        })
    }

    /// Sleep until `next` is due
    ///
    /// Without a monotonic deadline the wall clock is re-read at least every
    /// [`WALL_CLOCK_POLL`].
    async fn wait_for(&self, next: NextRun) {
        if let Some(deadline) = next.deadline {
            tokio::time::sleep_until(deadline).await;
            return;
        }
        while let Ok(remaining) = (next.at - self.clock.now()).to_std() {
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(remaining.min(WALL_CLOCK_POLL)).await;
        }
    }

    async fn run_cycle(&self, config: &SyncConfiguration) -> SyncResult {
        let _guard = self.cycle_lock.lock().await;

        let started = self.clock.now();
        self.state.send_modify(|s| {
            s.running = true;
            s.last_run = Some(started);
            s.next_run = None;
        });
        info!(run = self.state.borrow().run_count + 1, "Starting sync cycle");

        let result = self.cycle.execute(config).await;

        let finished = self.clock.now();
        let outcome = LastOutcome::from(&result);
        self.state.send_modify(|s| {
            s.running = false;
            s.last_finished = Some(finished);
            s.run_count += 1;
            if !result.success {
                s.failure_count += 1;
            }
            s.last_outcome = Some(outcome);
        });

        if result.success {
            info!(summary = %result.summary(), "Sync cycle succeeded");
        } else {
            warn!(summary = %result.summary(), "Sync cycle did not fully succeed");
        }

        result
    }
}
