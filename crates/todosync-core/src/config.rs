//! Sync configuration
//!
//! Built once at startup (CLI flags over config files) and never mutated.

use crate::error::ConfigError;
use chrono::NaiveTime;
use std::time::Duration;
use todosync_notes::ExportSettings;

/// Default interval between syncs
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Longest accepted interval
pub const MAX_INTERVAL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

/// Default number of tasks processed concurrently within a cycle
pub const DEFAULT_CONCURRENCY: usize = 4;

/// When cycles run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingMode {
    /// Fixed interval between cycle starts
    Interval(Duration),
    /// Once a day at a local `HH:MM`
    Daily(String),
}

impl TimingMode {
    /// Interval of `minutes`; an overflowing value saturates and fails validation
    pub fn every_minutes(minutes: u64) -> Self {
        Self::Interval(
            minutes
                .checked_mul(60)
                .map_or(Duration::MAX, Duration::from_secs),
        )
    }
}

impl Default for TimingMode {
    fn default() -> Self {
        Self::Interval(DEFAULT_INTERVAL)
    }
}

impl std::fmt::Display for TimingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval(d) => {
                let secs = d.as_secs();
                if secs % 60 == 0 {
                    write!(f, "every {} min", secs / 60)
                } else {
                    write!(f, "every {}s", secs)
                }
            }
            Self::Daily(at) => write!(f, "daily at {}", at),
        }
    }
}

/// Which projects to sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project
    #[default]
    All,
    /// A single project by id
    Id(String),
    /// A single project by name (case-insensitive)
    Name(String),
}

impl std::fmt::Display for ProjectScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Id(id) => write!(f, "id {}", id),
            Self::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Immutable configuration shared by the scheduler and the sync cycle
#[derive(Debug, Clone)]
pub struct SyncConfiguration {
    /// Output layout and tagging (includes the output root)
    pub export: ExportSettings,
    /// Todoist filter expression
    pub filter: Option<String>,
    /// Project scope
    pub project: ProjectScope,
    /// Export completed tasks as well
    pub include_completed: bool,
    /// Tasks processed concurrently within one cycle
    pub concurrency: usize,
    /// Timing policy for continuous mode
    pub timing: TimingMode,
    /// Run the first cycle as soon as the scheduler starts
    pub run_immediately: bool,
    /// Run exactly one cycle, then stop
    pub once: bool,
    /// Show the live status panel
    pub show_status: bool,
}

impl Default for SyncConfiguration {
    fn default() -> Self {
        Self {
            export: ExportSettings::default(),
            filter: None,
            project: ProjectScope::All,
            include_completed: false,
            concurrency: DEFAULT_CONCURRENCY,
            timing: TimingMode::default(),
            run_immediately: true,
            once: false,
            show_status: true,
        }
    }
}

impl SyncConfiguration {
    /// Configuration writing to `export.output_dir`
    pub fn new(export: ExportSettings) -> Self {
        Self {
            export,
            ..Self::default()
        }
    }

    /// Set the filter expression
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set the project scope
    #[must_use]
    pub fn with_project(mut self, project: ProjectScope) -> Self {
        self.project = project;
        self
    }

    /// Include completed tasks
    #[must_use]
    pub fn with_completed(mut self, include: bool) -> Self {
        self.include_completed = include;
        self
    }

    /// Set per-cycle concurrency
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the timing policy
    #[must_use]
    pub fn with_timing(mut self, timing: TimingMode) -> Self {
        self.timing = timing;
        self
    }

    /// Toggle running the first cycle at start-up
    #[must_use]
    pub fn with_run_immediately(mut self, run_immediately: bool) -> Self {
        self.run_immediately = run_immediately;
        self
    }

    /// Toggle single-run mode
    #[must_use]
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Toggle the status panel
    #[must_use]
    pub fn with_status(mut self, show: bool) -> Self {
        self.show_status = show;
        self
    }

    /// Check everything that does not need I/O
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.once {
            return Ok(());
        }
        match &self.timing {
            TimingMode::Interval(d) => check_interval(*d),
            TimingMode::Daily(at) => parse_time_of_day(at).map(|_| ()),
        }
    }
}

/// Non-zero and no longer than [`MAX_INTERVAL`]
pub fn check_interval(interval: Duration) -> Result<(), ConfigError> {
    if interval.is_zero() {
        Err(ConfigError::ZeroInterval)
    } else if interval > MAX_INTERVAL {
        Err(ConfigError::IntervalTooLarge {
            max_days: MAX_INTERVAL.as_secs() / 86_400,
        })
    } else {
        Ok(())
    }
}

/// Parse a 24-hour `HH:MM`
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = value.trim();
    let invalid = || ConfigError::InvalidTimeOfDay {
        value: value.to_string(),
    };

    let (hours, minutes) = trimmed.split_once(':').ok_or_else(invalid)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let h: u32 = hours.parse().map_err(|_| invalid())?;
    let m: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(h, m, 0).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfiguration::default();
        assert_eq!(config.timing, TimingMode::Interval(DEFAULT_INTERVAL));
        assert!(config.run_immediately);
        assert!(!config.once);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("09:30").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day(" 7:05 ").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
        assert_eq!(
            parse_time_of_day("23:59").unwrap(),
            NaiveTime::from_hms_opt(23, 59, 0).unwrap()
        );

        for bad in ["24:00", "12:60", "noon", "12", "12:5", "-1:30", "12:30:00", ""] {
            assert!(
                matches!(parse_time_of_day(bad), Err(ConfigError::InvalidTimeOfDay { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = SyncConfiguration::default().with_timing(TimingMode::Interval(Duration::ZERO));
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn test_validate_rejects_oversized_interval() {
        for timing in [
            TimingMode::Interval(Duration::MAX),
            TimingMode::every_minutes(1_000_000_000_000),
            TimingMode::every_minutes(u64::MAX),
        ] {
            let config = SyncConfiguration::default().with_timing(timing);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::IntervalTooLarge { max_days: 366 })
            ));
        }

        let longest = SyncConfiguration::default().with_timing(TimingMode::Interval(MAX_INTERVAL));
        assert!(longest.validate().is_ok());
    }

    #[test]
    fn test_every_minutes() {
        assert_eq!(TimingMode::every_minutes(5), TimingMode::Interval(Duration::from_secs(300)));
        assert_eq!(TimingMode::every_minutes(u64::MAX), TimingMode::Interval(Duration::MAX));
    }

    #[test]
    fn test_validate_rejects_bad_daily_time() {
        let config = SyncConfiguration::default().with_timing(TimingMode::Daily("25:00".into()));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeOfDay { .. })
        ));
    }

    #[test]
    fn test_once_ignores_timing_fields() {
        let config = SyncConfiguration::default()
            .with_timing(TimingMode::Daily("garbage".into()))
            .with_once(true);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = SyncConfiguration::default().with_concurrency(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));
    }

    #[test]
    fn test_timing_display() {
        assert_eq!(
            TimingMode::Interval(Duration::from_secs(900)).to_string(),
            "every 15 min"
        );
        assert_eq!(TimingMode::Interval(Duration::from_secs(45)).to_string(), "every 45s");
        assert_eq!(TimingMode::Daily("08:00".into()).to_string(), "daily at 08:00");
    }
}
