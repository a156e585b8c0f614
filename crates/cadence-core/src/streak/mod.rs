//! Streak aggregator.
//!
//! Computes the cross-habit streak: a day is satisfied when every active
//! habit that was due that day has a completion, and vacuously satisfied
//! when nothing was due. The current streak is the run of satisfied days
//! ending today, walked backward and capped at [`MAX_STREAK_DAYS`].
//!
//! The aggregator never performs I/O. Callers hand it the habit list and a
//! fully materialized [`CompletionLookup`] (see [`crate::storage::Snapshot`]).

mod milestone;

pub use milestone::{format_streak, milestone_reached, StreakMilestone};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::completion::CompletionLookup;
use crate::habit::Habit;
use crate::recurrence::is_due;

/// Hard cap on the backward walk.
pub const MAX_STREAK_DAYS: u32 = 365;

/// Tunables for the backward walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakOptions {
    /// Days examined at most, clamped to `1..=365`.
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    /// End the walk once the date precedes every active habit's creation.
    /// Off by default: pre-creation days have nothing due and count as
    /// satisfied.
    #[serde(default)]
    pub stop_at_history_start: bool,
}

fn default_max_days() -> u32 {
    MAX_STREAK_DAYS
}

impl Default for StreakOptions {
    fn default() -> Self {
        Self {
            max_days: default_max_days(),
            stop_at_history_start: false,
        }
    }
}

impl StreakOptions {
    /// `max_days` clamped to the supported range.
    pub fn effective_max_days(&self) -> u32 {
        self.max_days.clamp(1, MAX_STREAK_DAYS)
    }
}

/// Aggregated streak and today's progress.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Active habits due today and completed today.
    pub completed_today: u32,
    /// All active habits, due today or not.
    pub total_active: u32,
    pub milestone: Option<StreakMilestone>,
}

impl StreakResult {
    /// `completed_today / total_active`, zero without active habits.
    pub fn completion_ratio(&self) -> f64 {
        if self.total_active == 0 {
            0.0
        } else {
            self.completed_today as f64 / self.total_active as f64
        }
    }
}

/// One habit's standing on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDayStatus {
    pub habit_id: String,
    pub name: String,
    pub due: bool,
    pub completed: bool,
    pub satisfied: bool,
}

/// Every active habit's standing on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub satisfied: bool,
    pub habits: Vec<HabitDayStatus>,
}

/// Not due on `date`, or due and completed.
pub fn is_satisfied<L>(habit: &Habit, completions: &L, date: NaiveDate) -> bool
where
    L: CompletionLookup + ?Sized,
{
    !is_due(habit, date) || completions.is_completed(&habit.id, date)
}

/// Streak aggregator configured with [`StreakOptions`].
#[derive(Debug, Clone, Default)]
pub struct StreakAggregator {
    options: StreakOptions,
}

impl StreakAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StreakOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StreakOptions {
        &self.options
    }

    /// Compute the full [`StreakResult`] for `today`.
    pub fn compute<L>(&self, habits: &[Habit], completions: &L, today: NaiveDate) -> StreakResult
    where
        L: CompletionLookup + ?Sized,
    {
        let active = active_habits(habits);
        if active.is_empty() {
            return StreakResult::default();
        }

        let completed_today = active
            .iter()
            .filter(|h| is_due(h, today) && completions.is_completed(&h.id, today))
            .count() as u32;

        let current_streak = self.current_streak(&active, completions, today);
        let longest_streak = self.longest_streak(&active, completions, today);

        StreakResult {
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            completed_today,
            total_active: active.len() as u32,
            milestone: milestone_reached(current_streak),
        }
    }

    /// Report for a single date across active habits.
    pub fn day_report<L>(&self, habits: &[Habit], completions: &L, date: NaiveDate) -> DayReport
    where
        L: CompletionLookup + ?Sized,
    {
        report_for(&active_habits(habits), completions, date)
    }

    /// Reports for `today` and the `days - 1` days before it, newest first.
    pub fn history<L>(
        &self,
        habits: &[Habit],
        completions: &L,
        today: NaiveDate,
        days: u32,
    ) -> Vec<DayReport>
    where
        L: CompletionLookup + ?Sized,
    {
        let active = active_habits(habits);
        let days = days.clamp(1, MAX_STREAK_DAYS);
        let mut reports = Vec::with_capacity(days as usize);
        let mut date = today;
        for _ in 0..days {
            reports.push(report_for(&active, completions, date));
            match date.pred_opt() {
                Some(prev) => date = prev,
                None => break,
            }
        }
        reports
    }

    fn history_floor(&self, active: &[&Habit]) -> Option<NaiveDate> {
        if !self.options.stop_at_history_start {
            return None;
        }
        active.iter().map(|h| h.created_on()).min()
    }

    fn current_streak<L>(&self, active: &[&Habit], completions: &L, today: NaiveDate) -> u32
    where
        L: CompletionLookup + ?Sized,
    {
        let floor = self.history_floor(active);
        let mut streak = 0;
        let mut date = today;

        for _ in 0..self.options.effective_max_days() {
            if floor.is_some_and(|f| date < f) {
                debug!(streak, %date, "streak walk reached history start");
                return streak;
            }
            if !day_satisfied(active, completions, date) {
                debug!(streak, %date, "streak walk stopped at unsatisfied day");
                return streak;
            }
            streak += 1;
            match date.pred_opt() {
                Some(prev) => date = prev,
                None => break,
            }
        }

        debug!(streak, "streak walk hit the day cap");
        streak
    }

    /// Longest run of satisfied days inside the walk window ending today.
    fn longest_streak<L>(&self, active: &[&Habit], completions: &L, today: NaiveDate) -> u32
    where
        L: CompletionLookup + ?Sized,
    {
        let span = i64::from(self.options.effective_max_days()) - 1;
        let mut start = today
            .checked_sub_signed(Duration::days(span))
            .unwrap_or(NaiveDate::MIN);
        if let Some(floor) = self.history_floor(active) {
            start = start.max(floor);
        }
        if start > today {
            return 0;
        }

        let mut longest = 0;
        let mut run = 0;
        for date in start.iter_days().take_while(|d| *d <= today) {
            if day_satisfied(active, completions, date) {
                run += 1;
                longest = longest.max(run);
            } else {
                run = 0;
            }
        }
        longest
    }
}

/// [`StreakAggregator::compute`] with default options.
pub fn compute_stats<L>(habits: &[Habit], completions: &L, today: NaiveDate) -> StreakResult
where
    L: CompletionLookup + ?Sized,
{
    StreakAggregator::new().compute(habits, completions, today)
}

/// [`StreakAggregator::compute`] with explicit options.
pub fn compute_stats_with<L>(
    habits: &[Habit],
    completions: &L,
    today: NaiveDate,
    options: StreakOptions,
) -> StreakResult
where
    L: CompletionLookup + ?Sized,
{
    StreakAggregator::with_options(options).compute(habits, completions, today)
}

/// [`StreakAggregator::day_report`] with default options.
pub fn day_report<L>(habits: &[Habit], completions: &L, date: NaiveDate) -> DayReport
where
    L: CompletionLookup + ?Sized,
{
    StreakAggregator::new().day_report(habits, completions, date)
}

fn active_habits(habits: &[Habit]) -> Vec<&Habit> {
    habits.iter().filter(|h| h.is_active()).collect()
}

fn day_satisfied<L>(active: &[&Habit], completions: &L, date: NaiveDate) -> bool
where
    L: CompletionLookup + ?Sized,
{
    active.iter().all(|h| is_satisfied(h, completions, date))
}

fn report_for<L>(active: &[&Habit], completions: &L, date: NaiveDate) -> DayReport
where
    L: CompletionLookup + ?Sized,
{
    let habits: Vec<HabitDayStatus> = active
        .iter()
        .map(|h| {
            let due = is_due(h, date);
            let completed = completions.is_completed(&h.id, date);
            HabitDayStatus {
                habit_id: h.id.clone(),
                name: h.name.clone(),
                due,
                completed,
                satisfied: !due || completed,
            }
        })
        .collect();

    DayReport {
        date,
        satisfied: habits.iter().all(|s| s.satisfied),
        habits,
    }
}
