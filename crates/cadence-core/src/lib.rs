//! # Cadence Core Library
//!
//! Habit cadence and streak engine for a habit tracker. Given each habit's
//! recurrence rule and a history of completions, it decides which dates a
//! habit was due, whether each day was satisfied, and how long the current
//! cross-habit streak is.
//!
//! ## Architecture
//!
//! - **Recurrence Evaluator**: pure `(rule, date) -> due` predicates
//! - **Streak Aggregator**: backward walk over satisfied days, today's
//!   progress, per-day reports
//! - **Storage**: SQLite habit/completion store and TOML configuration; it
//!   loads a bounded [`Snapshot`] so the engine itself never does I/O
//!
//! ## Key Components
//!
//! - [`is_due`]: recurrence predicate
//! - [`compute_stats`]: streak and today's ratio
//! - [`CompletionSet`]: in-memory completion index
//! - [`Database`]: habit and completion persistence
//! - [`Config`]: application configuration management

pub mod completion;
pub mod error;
pub mod habit;
pub mod recurrence;
pub mod storage;
pub mod streak;

pub use completion::{CompletionLookup, CompletionRecord, CompletionSet};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use habit::{Frequency, Habit, RecurrenceRule, WEEKDAY_LABELS};
pub use recurrence::{due_dates_between, is_due, next_due_on_or_after, weekday_index};
pub use storage::{Config, Database, Snapshot};
pub use streak::{
    compute_stats, compute_stats_with, day_report, format_streak, is_satisfied,
    milestone_reached, DayReport, HabitDayStatus, StreakAggregator, StreakMilestone,
    StreakOptions, StreakResult, MAX_STREAK_DAYS,
};
