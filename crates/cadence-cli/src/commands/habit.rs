//! Habit management commands for CLI.

use cadence_core::{Database, Frequency, Habit, RecurrenceRule};
use chrono::{NaiveTime, Utc};
use clap::Subcommand;
use serde::Serialize;

use super::{print_json, CommandResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// Habit description
        #[arg(long)]
        description: Option<String>,
        /// daily, weekly or monthly (default: daily)
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// Comma-separated target days: weekdays 1-7 (1 = Sunday) or days of month 1-31
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Reminder time (HH:MM), display only
        #[arg(long, value_parser = parse_reminder)]
        reminder: Option<NaiveTime>,
        /// Owner ID
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Get habit details
    Get {
        /// Habit ID
        id: String,
    },
    /// Update a habit
    Edit {
        /// Habit ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New frequency
        #[arg(long)]
        frequency: Option<Frequency>,
        /// New comma-separated target days
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u8>>,
    },
    /// Archive a habit (excluded from streaks)
    Archive {
        /// Habit ID
        id: String,
    },
    /// Restore an archived habit
    Unarchive {
        /// Habit ID
        id: String,
    },
    /// Delete a habit and its completions
    Delete {
        /// Habit ID
        id: String,
    },
}

/// A habit plus its list-view summary.
#[derive(Serialize)]
struct HabitView<'a> {
    #[serde(flatten)]
    habit: &'a Habit,
    schedule: String,
    target_labels: Vec<String>,
}

impl<'a> HabitView<'a> {
    fn new(habit: &'a Habit) -> Self {
        Self {
            habit,
            schedule: habit.rule.describe(),
            target_labels: habit.rule.target_labels(),
        }
    }
}

fn parse_reminder(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

pub fn run(action: HabitAction) -> CommandResult {
    let db = Database::open()?;

    match action {
        HabitAction::Add {
            name,
            description,
            frequency,
            days,
            reminder,
            owner,
        } => {
            let rule = RecurrenceRule {
                frequency,
                target_days: days.into_iter().collect(),
            };
            let mut habit = Habit::new(owner, name, rule);
            habit.description = description;
            habit.reminder_time = reminder;
            db.create_habit(&habit)?;
            eprintln!("Habit created: {}", habit.id);
            print_json(&HabitView::new(&habit))?;
        }
        HabitAction::List { all } => {
            let habits = db.list_habits(all)?;
            let views: Vec<_> = habits.iter().map(HabitView::new).collect();
            print_json(&views)?;
        }
        HabitAction::Get { id } => {
            let habit = db.get_habit(&id)?;
            print_json(&HabitView::new(&habit))?;
        }
        HabitAction::Edit {
            id,
            name,
            description,
            frequency,
            days,
        } => {
            let habit = db.get_habit(&id)?;

            let rule = if frequency.is_some() || days.is_some() {
                let frequency = frequency.unwrap_or(habit.rule.frequency);
                let target_days = match days {
                    Some(days) => days.into_iter().collect(),
                    // Target days mean something else under a new frequency.
                    None if frequency != habit.rule.frequency => Default::default(),
                    None => habit.rule.target_days.clone(),
                };
                let rule = RecurrenceRule {
                    frequency,
                    target_days,
                };
                // Validate before any write.
                rule.validate()?;
                Some(rule)
            } else {
                None
            };

            if name.is_some() || description.is_some() {
                let name = name.unwrap_or_else(|| habit.name.clone());
                db.rename_habit(&id, &name, description.as_deref())?;
            }
            if let Some(rule) = rule {
                db.update_rule(&id, &rule)?;
            }

            let habit = db.get_habit(&id)?;
            print_json(&HabitView::new(&habit))?;
        }
        HabitAction::Archive { id } => {
            db.archive_habit(&id, Utc::now())?;
            println!("Habit archived: {id}");
        }
        HabitAction::Unarchive { id } => {
            db.unarchive_habit(&id)?;
            println!("Habit unarchived: {id}");
        }
        HabitAction::Delete { id } => {
            db.delete_habit(&id)?;
            println!("Habit deleted: {id}");
        }
    }
    Ok(())
}
