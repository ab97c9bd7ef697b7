//! Todosync Core - Sync Engine
//!
//! This crate contains the engine that keeps an Obsidian vault in step with
//! Todoist:
//! - Config: [`SyncConfiguration`], the immutable run settings
//! - Cycle: [`SyncCycle`], one fetch → render → write pass
//! - Scheduler: [`Scheduler`], interval / daily / once timing with
//!   cooperative shutdown and a watchable [`ScheduleState`]
//! - Errors: configuration, timing, cycle and per-task failures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cycle;
pub mod error;
pub mod scheduler;
pub mod shutdown;

pub use config::{
    check_interval, parse_time_of_day, ProjectScope, SyncConfiguration, TimingMode,
    DEFAULT_CONCURRENCY, DEFAULT_INTERVAL, MAX_INTERVAL,
};
pub use cycle::{SyncCycle, SyncResult, TaskWarning};
pub use error::{
    format_error_for_cli, ConfigError, CycleFailure, FailureKind, TaskError, TaskStage,
    TimingError, UserFriendlyError,
};
pub use scheduler::{
    Clock, ExitOutcome, LastOutcome, OutcomeStatus, ScheduleState, Scheduler, StatusHandle,
    SystemClock,
};
pub use shutdown::{spawn_signal_listener, wait_for_shutdown_signal, ShutdownHandle};
