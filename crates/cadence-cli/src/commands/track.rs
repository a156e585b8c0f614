//! Completion tracking commands for CLI.

use cadence_core::{is_due, next_due_on_or_after, Database};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::{date_or_today, print_json, CommandResult};

#[derive(Serialize)]
struct DoneOutput {
    habit_id: String,
    date: NaiveDate,
    completed: bool,
    due: bool,
}

#[derive(Serialize)]
struct DueOutput {
    habit_id: String,
    date: NaiveDate,
    due: bool,
    next_due: Option<NaiveDate>,
    schedule: String,
}

/// Toggle the completion for (habit, date).
pub fn done(id: &str, date: Option<NaiveDate>) -> CommandResult {
    let db = Database::open()?;
    let habit = db.get_habit(id)?;
    let date = date_or_today(date);

    let completed = db.toggle_completion(id, date, Utc::now())?;
    let due = is_due(&habit, date);
    if completed && !due {
        eprintln!("note: {} is not due on {date}", habit.name);
    }

    print_json(&DoneOutput {
        habit_id: habit.id,
        date,
        completed,
        due,
    })
}

pub fn due(id: &str, date: Option<NaiveDate>) -> CommandResult {
    let db = Database::open()?;
    let habit = db.get_habit(id)?;
    let date = date_or_today(date);

    print_json(&DueOutput {
        date,
        due: is_due(&habit, date),
        next_due: next_due_on_or_after(&habit, date),
        schedule: habit.rule.describe(),
        habit_id: habit.id,
    })
}
