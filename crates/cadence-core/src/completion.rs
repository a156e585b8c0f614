//! Completion records and the in-memory index the aggregator reads.
//!
//! Completions are keyed by (habit id, calendar date). The timestamp on a
//! record is informational; any completion recorded for a date counts for
//! that whole date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A habit marked done on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub habit_id: String,
    pub completion_date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(habit_id: impl Into<String>, completion_date: NaiveDate) -> Self {
        Self {
            habit_id: habit_id.into(),
            completion_date,
            completed_at: Utc::now(),
        }
    }
}

/// Answers "was this habit completed on this date?".
///
/// The aggregator only ever reads through this trait, so any fully
/// materialized view of completions can back it.
pub trait CompletionLookup {
    fn is_completed(&self, habit_id: &str, date: NaiveDate) -> bool;
}

impl<F> CompletionLookup for F
where
    F: Fn(&str, NaiveDate) -> bool,
{
    fn is_completed(&self, habit_id: &str, date: NaiveDate) -> bool {
        self(habit_id, date)
    }
}

/// Set of (habit id, date) pairs, at most one entry per pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    by_habit: HashMap<String, BTreeSet<NaiveDate>>,
    len: usize,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CompletionRecord>) -> Self {
        let mut set = Self::new();
        for record in records {
            set.insert(&record.habit_id, record.completion_date);
        }
        set
    }

    /// Mark done. Returns `false` if the pair was already present.
    pub fn insert(&mut self, habit_id: &str, date: NaiveDate) -> bool {
        let inserted = self
            .by_habit
            .entry(habit_id.to_string())
            .or_default()
            .insert(date);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Unmark. Returns `false` if the pair was absent.
    pub fn remove(&mut self, habit_id: &str, date: NaiveDate) -> bool {
        let Some(dates) = self.by_habit.get_mut(habit_id) else {
            return false;
        };
        let removed = dates.remove(&date);
        if removed {
            self.len -= 1;
            if dates.is_empty() {
                self.by_habit.remove(habit_id);
            }
        }
        removed
    }

    /// Flip the pair's presence and return whether it is now present.
    pub fn toggle(&mut self, habit_id: &str, date: NaiveDate) -> bool {
        if self.remove(habit_id, date) {
            false
        } else {
            self.insert(habit_id, date)
        }
    }

    pub fn contains(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.by_habit
            .get(habit_id)
            .is_some_and(|dates| dates.contains(&date))
    }

    /// Completion dates for one habit, oldest first.
    pub fn dates_for(&self, habit_id: &str) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_habit
            .get(habit_id)
            .into_iter()
            .flat_map(|dates| dates.iter().copied())
    }

    /// Drop everything outside `from..=to`.
    pub fn retain_window(&mut self, from: NaiveDate, to: NaiveDate) {
        let mut len = 0;
        self.by_habit.retain(|_, dates| {
            dates.retain(|d| *d >= from && *d <= to);
            len += dates.len();
            !dates.is_empty()
        });
        self.len = len;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl CompletionLookup for CompletionSet {
    fn is_completed(&self, habit_id: &str, date: NaiveDate) -> bool {
        self.contains(habit_id, date)
    }
}

impl FromIterator<CompletionRecord> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CompletionRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(&record.habit_id, record.completion_date);
        }
        set
    }
}
