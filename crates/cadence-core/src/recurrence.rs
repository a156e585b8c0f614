//! Recurrence evaluator.
//!
//! Maps a habit's rule and a calendar date to due / not due. Everything
//! here is pure and works on `NaiveDate`, so no time-of-day or timezone
//! conversion ever enters a due-date decision.
//!
//! - Daily habits are due every day from creation onward.
//! - Weekly habits are due when the weekday index (1 = Sunday) is a target.
//! - Monthly habits are due when the day of the month is a target. A target
//!   that does not exist in a given month (31 in April) is skipped for that
//!   month, never clamped to the last day.

use chrono::{Datelike, NaiveDate};

use crate::habit::{Frequency, Habit, RecurrenceRule};

/// Upper bound for the forward search in [`next_due_on_or_after`].
pub const MAX_LOOKAHEAD_DAYS: usize = 366;

/// Weekday index of `date` with 1 = Sunday through 7 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().number_from_sunday() as u8
}

impl RecurrenceRule {
    /// Whether the rule fires on `date`, ignoring when the habit was created.
    ///
    /// Out-of-range targets never match and an empty weekly or monthly rule
    /// never fires.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self.frequency {
            Frequency::Daily => true,
            Frequency::Weekly => self.target_days.contains(&weekday_index(date)),
            Frequency::Monthly => self.target_days.contains(&(date.day() as u8)),
        }
    }
}

/// Whether `habit` was due on `date`.
///
/// Dates before the habit's creation date are never due.
pub fn is_due(habit: &Habit, date: NaiveDate) -> bool {
    date >= habit.created_on() && habit.rule.matches(date)
}

/// First date on or after `date` (and never before creation) on which the
/// habit is due. `None` when the rule cannot fire within a year.
pub fn next_due_on_or_after(habit: &Habit, date: NaiveDate) -> Option<NaiveDate> {
    let start = date.max(habit.created_on());
    start
        .iter_days()
        .take(MAX_LOOKAHEAD_DAYS)
        .find(|d| habit.rule.matches(*d))
}

/// Every due date in `from..=to`, oldest first.
pub fn due_dates_between(habit: &Habit, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if to < from {
        return Vec::new();
    }
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| is_due(habit, *d))
        .collect()
}

impl Habit {
    /// Shorthand for [`is_due`].
    pub fn is_due(&self, date: NaiveDate) -> bool {
        is_due(self, date)
    }
}
