//! SQLite-based habit and completion storage.
//!
//! Provides persistent storage for:
//! - Habits and their recurrence rules
//! - Completion records, one per (habit, date)
//! - Bounded snapshots handed to the streak aggregator

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{data_dir, migrations, Snapshot};
use crate::completion::{CompletionRecord, CompletionSet};
use crate::error::{CoreError, DatabaseError, Result};
use crate::habit::{Frequency, Habit, RecurrenceRule};
use crate::streak::MAX_STREAK_DAYS;

const DATE_FORMAT: &str = "%Y-%m-%d";
const REMINDER_FORMAT: &str = "%H:%M";

const HABIT_COLUMNS: &str = "id, owner_id, name, description, frequency, target_days,
     reminder_time, created_at, archived_at";

/// SQLite database for habits and completions.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/cadence.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("cadence.db"))
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Habits ──────────────────────────────────────────────────────────

    /// Insert a new habit after validating its recurrence rule.
    ///
    /// # Errors
    /// Returns a validation error for an empty or out-of-range weekly/monthly
    /// rule, or a database error if the insert fails.
    pub fn create_habit(&self, habit: &Habit) -> Result<()> {
        habit.rule.validate()?;
        self.conn.execute(
            "INSERT INTO habits (id, owner_id, name, description, frequency, target_days,
                                 reminder_time, created_at, archived_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                habit.id,
                habit.owner_id,
                habit.name,
                habit.description,
                habit.rule.frequency.as_str(),
                encode_target_days(&habit.rule.target_days)?,
                habit.reminder_time.map(|t| t.format(REMINDER_FORMAT).to_string()),
                habit.created_at.to_rfc3339(),
                habit.archived_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        info!(habit_id = %habit.id, frequency = %habit.rule.frequency, "habit created");
        Ok(())
    }

    /// # Errors
    /// Returns `NotFound` if no habit has this id.
    pub fn get_habit(&self, id: &str) -> Result<Habit> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![id],
                HabitRow::from_row,
            )
            .optional()?;
        match row {
            Some(row) => row.into_habit(),
            None => Err(not_found("habit", id)),
        }
    }

    /// Habits newest first. Rows that fail to decode are logged and skipped.
    pub fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>> {
        let sql = if include_archived {
            format!("SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at DESC")
        } else {
            format!(
                "SELECT {HABIT_COLUMNS} FROM habits WHERE archived_at IS NULL
                 ORDER BY created_at DESC"
            )
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], HabitRow::from_row)?;

        let mut habits = Vec::new();
        for row in rows {
            let row = row?;
            let id = row.id.clone();
            match row.into_habit() {
                Ok(habit) => habits.push(habit),
                Err(e) => warn!(habit_id = %id, "skipping undecodable habit row: {e}"),
            }
        }
        Ok(habits)
    }

    /// Replace a habit's recurrence rule. Past dates are re-judged under the
    /// new rule; no history is kept.
    ///
    /// # Errors
    /// Returns a validation error for an invalid rule or `NotFound`.
    pub fn update_rule(&self, id: &str, rule: &RecurrenceRule) -> Result<()> {
        rule.validate()?;
        let changed = self.conn.execute(
            "UPDATE habits SET frequency = ?1, target_days = ?2 WHERE id = ?3",
            params![rule.frequency.as_str(), encode_target_days(&rule.target_days)?, id],
        )?;
        ensure_changed(changed, "habit", id)?;
        info!(habit_id = %id, frequency = %rule.frequency, "habit rule updated");
        Ok(())
    }

    /// # Errors
    /// Returns `NotFound` if no habit has this id.
    pub fn rename_habit(&self, id: &str, name: &str, description: Option<&str>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits SET name = ?1, description = COALESCE(?2, description) WHERE id = ?3",
            params![name, description, id],
        )?;
        ensure_changed(changed, "habit", id)
    }

    /// # Errors
    /// Returns `NotFound` if no habit has this id.
    pub fn archive_habit(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits SET archived_at = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), id],
        )?;
        ensure_changed(changed, "habit", id)?;
        info!(habit_id = %id, "habit archived");
        Ok(())
    }

    /// # Errors
    /// Returns `NotFound` if no habit has this id.
    pub fn unarchive_habit(&self, id: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habits SET archived_at = NULL WHERE id = ?1",
            params![id],
        )?;
        ensure_changed(changed, "habit", id)?;
        info!(habit_id = %id, "habit unarchived");
        Ok(())
    }

    /// Delete a habit together with its completions.
    ///
    /// # Errors
    /// Returns `NotFound` if no habit has this id.
    pub fn delete_habit(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1",
            params![id],
        )?;
        let changed = tx.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        ensure_changed(changed, "habit", id)?;
        tx.commit()?;
        info!(habit_id = %id, "habit deleted");
        Ok(())
    }

    // ── Completions ─────────────────────────────────────────────────────

    /// Mark a habit done for `date`. Returns `false` if it already was.
    ///
    /// # Errors
    /// Returns `NotFound` if the habit does not exist.
    pub fn set_completion(
        &self,
        habit_id: &str,
        date: NaiveDate,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.ensure_habit(habit_id)?;
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO habit_completions (habit_id, completion_date, completed_at)
             VALUES (?1, ?2, ?3)",
            params![habit_id, encode_date(date), completed_at.to_rfc3339()],
        )?;
        Ok(inserted > 0)
    }

    /// Unmark a habit for `date`. Returns `false` if it was not marked.
    pub fn clear_completion(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
            params![habit_id, encode_date(date)],
        )?;
        Ok(deleted > 0)
    }

    /// Flip the completion for (habit, date). Returns whether it is now done.
    ///
    /// # Errors
    /// Returns `NotFound` if the habit does not exist.
    pub fn toggle_completion(
        &self,
        habit_id: &str,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.ensure_habit(habit_id)?;
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
            params![habit_id, encode_date(date)],
        )?;
        if removed == 0 {
            tx.execute(
                "INSERT INTO habit_completions (habit_id, completion_date, completed_at)
                 VALUES (?1, ?2, ?3)",
                params![habit_id, encode_date(date), at.to_rfc3339()],
            )?;
        }
        tx.commit()?;

        let completed = removed == 0;
        info!(habit_id = %habit_id, %date, completed, "completion toggled");
        Ok(completed)
    }

    pub fn is_completed(&self, habit_id: &str, date: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_completions WHERE habit_id = ?1 AND completion_date = ?2",
            params![habit_id, encode_date(date)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Completions dated within `from..=to`, oldest first.
    pub fn completions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT habit_id, completion_date, completed_at
             FROM habit_completions
             WHERE completion_date >= ?1 AND completion_date <= ?2
             ORDER BY completion_date ASC, habit_id ASC",
        )?;
        let rows = stmt.query_map(params![encode_date(from), encode_date(to)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (habit_id, date, completed_at) = row?;
            match (decode_date(&date), decode_timestamp(&completed_at)) {
                (Ok(completion_date), Ok(completed_at)) => records.push(CompletionRecord {
                    habit_id,
                    completion_date,
                    completed_at,
                }),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(habit_id = %habit_id, "skipping undecodable completion row: {e}")
                }
            }
        }
        Ok(records)
    }

    /// Load active habits and the last `window_days` days of completions.
    ///
    /// `window_days` is clamped to `1..=365`.
    pub fn snapshot(&self, today: NaiveDate, window_days: u32) -> Result<Snapshot> {
        let days = window_days.clamp(1, MAX_STREAK_DAYS);
        let window_start = today
            .checked_sub_signed(Duration::days(i64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);

        let habits = self.list_habits(false)?;
        let completions = CompletionSet::from_records(&self.completions_between(window_start, today)?);
        debug!(
            habits = habits.len(),
            completions = completions.len(),
            %window_start,
            %today,
            "snapshot loaded"
        );

        Ok(Snapshot {
            today,
            window_start,
            habits,
            completions,
        })
    }

    fn ensure_habit(&self, id: &str) -> Result<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(not_found("habit", id));
        }
        Ok(())
    }
}

/// Raw column values, decoded outside the rusqlite closure so a bad row
/// can be reported with a typed error.
struct HabitRow {
    id: String,
    owner_id: String,
    name: String,
    description: Option<String>,
    frequency: String,
    target_days: String,
    reminder_time: Option<String>,
    created_at: String,
    archived_at: Option<String>,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            frequency: row.get(4)?,
            target_days: row.get(5)?,
            reminder_time: row.get(6)?,
            created_at: row.get(7)?,
            archived_at: row.get(8)?,
        })
    }

    fn into_habit(self) -> Result<Habit> {
        let frequency: Frequency = self.frequency.parse()?;
        let target_days: BTreeSet<u8> = serde_json::from_str(&self.target_days)?;
        let reminder_time = self
            .reminder_time
            .as_deref()
            .map(|s| {
                NaiveTime::parse_from_str(s, REMINDER_FORMAT)
                    .map_err(|e| CoreError::Custom(format!("invalid reminder time '{s}': {e}")))
            })
            .transpose()?;
        let archived_at = self.archived_at.as_deref().map(decode_timestamp).transpose()?;

        Ok(Habit {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            rule: RecurrenceRule {
                frequency,
                target_days,
            },
            reminder_time,
            created_at: decode_timestamp(&self.created_at)?,
            archived_at,
        })
    }
}

fn encode_target_days(days: &BTreeSet<u8>) -> Result<String> {
    Ok(serde_json::to_string(days)?)
}

fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn decode_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| CoreError::Custom(format!("invalid date '{s}': {e}")))
}

fn decode_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::Custom(format!("invalid timestamp '{s}': {e}")))
}

fn not_found(entity: &'static str, id: &str) -> CoreError {
    DatabaseError::NotFound {
        entity,
        id: id.to_string(),
    }
    .into()
}

fn ensure_changed(changed: usize, entity: &'static str, id: &str) -> Result<()> {
    if changed == 0 {
        Err(not_found(entity, id))
    } else {
        Ok(())
    }
}
