//! Habit data model.
//!
//! A habit carries its recurrence rule inline: a [`Frequency`] plus the
//! set of target days whose meaning depends on it. Weekly targets use
//! 1 = Sunday through 7 = Saturday; monthly targets are days of the month.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;

/// Weekday labels indexed by `weekday_index - 1`.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How often a habit recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Largest valid target day for this frequency.
    pub fn max_target_day(&self) -> u8 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 31,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ValidationError::UnknownFrequency(other.to_string())),
        }
    }
}

/// Recurrence rule: frequency plus target days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default)]
    pub target_days: BTreeSet<u8>,
}

impl RecurrenceRule {
    pub fn daily() -> Self {
        Self {
            frequency: Frequency::Daily,
            target_days: BTreeSet::new(),
        }
    }

    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            frequency: Frequency::Weekly,
            target_days: days.into_iter().collect(),
        }
    }

    pub fn monthly(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            frequency: Frequency::Monthly,
            target_days: days.into_iter().collect(),
        }
    }

    /// Check the rule the way a creation form would.
    ///
    /// # Errors
    /// `InvalidRecurrenceRule` when a weekly or monthly rule has no target
    /// days, `TargetDayOutOfRange` for the first value outside 1-7 / 1-31.
    /// Daily rules always pass; their target days are ignored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.frequency == Frequency::Daily {
            return Ok(());
        }
        if self.target_days.is_empty() {
            return Err(ValidationError::InvalidRecurrenceRule {
                frequency: self.frequency,
                reason: "at least one target day is required".into(),
            });
        }
        let max = self.frequency.max_target_day();
        if let Some(&day) = self.target_days.iter().find(|&&d| d == 0 || d > max) {
            return Err(ValidationError::TargetDayOutOfRange {
                frequency: self.frequency,
                day,
            });
        }
        Ok(())
    }

    /// Summary shown in habit lists ("Daily", "2 days per week", ...).
    pub fn describe(&self) -> String {
        let count = self.target_days.len();
        let unit = if count == 1 { "day" } else { "days" };
        match self.frequency {
            Frequency::Daily => "Daily".to_string(),
            Frequency::Weekly => format!("{count} {unit} per week"),
            Frequency::Monthly => format!("{count} {unit} per month"),
        }
    }

    /// Labels for each target day (`Mon`, `Wed` for weekly; `1`, `15` for monthly).
    pub fn target_labels(&self) -> Vec<String> {
        match self.frequency {
            Frequency::Daily => Vec::new(),
            Frequency::Weekly => self
                .target_days
                .iter()
                .filter_map(|&d| {
                    (d as usize)
                        .checked_sub(1)
                        .and_then(|i| WEEKDAY_LABELS.get(i))
                        .map(|s| s.to_string())
                })
                .collect(),
            Frequency::Monthly => self.target_days.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::daily()
    }
}

/// A tracked habit as the store hands it to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub rule: RecurrenceRule,
    /// Display-only; never consulted by the engine.
    pub reminder_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Habit {
    /// Create a habit with a fresh id, created now.
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, rule: RecurrenceRule) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.into(),
            name: name.into(),
            description: None,
            rule,
            reminder_time: None,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reminder(mut self, time: NaiveTime) -> Self {
        self.reminder_time = Some(time);
        self
    }

    /// Backdate the habit so that it exists from `date` onward.
    pub fn created_on_date(mut self, date: NaiveDate) -> Self {
        self.created_at = date.and_time(NaiveTime::MIN).and_utc();
        self
    }

    /// Calendar date (UTC) the habit came into existence.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn is_active(&self) -> bool {
        self.archived_at.is_none()
    }

    pub fn frequency(&self) -> Frequency {
        self.rule.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(" monthly ".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!(
            "hourly".parse::<Frequency>(),
            Err(ValidationError::UnknownFrequency("hourly".into()))
        );
    }

    #[test]
    fn empty_weekly_rule_is_invalid() {
        let err = RecurrenceRule::weekly([]).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidRecurrenceRule {
                frequency: Frequency::Weekly,
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_targets_are_reported() {
        assert_eq!(
            RecurrenceRule::weekly([2, 8]).validate(),
            Err(ValidationError::TargetDayOutOfRange {
                frequency: Frequency::Weekly,
                day: 8
            })
        );
        assert_eq!(
            RecurrenceRule::monthly([0, 15]).validate(),
            Err(ValidationError::TargetDayOutOfRange {
                frequency: Frequency::Monthly,
                day: 0
            })
        );
        assert!(RecurrenceRule::monthly([1, 31]).validate().is_ok());
    }

    #[test]
    fn daily_rule_ignores_target_days() {
        let rule = RecurrenceRule {
            frequency: Frequency::Daily,
            target_days: [99].into_iter().collect(),
        };
        assert!(rule.validate().is_ok());
        assert_eq!(rule.describe(), "Daily");
    }

    #[test]
    fn describe_matches_list_summary() {
        assert_eq!(RecurrenceRule::weekly([2, 4]).describe(), "2 days per week");
        assert_eq!(RecurrenceRule::monthly([15]).describe(), "1 day per month");
    }

    #[test]
    fn weekly_labels_start_on_sunday() {
        let rule = RecurrenceRule::weekly([1, 2, 7, 9]);
        assert_eq!(rule.target_labels(), vec!["Sun", "Mon", "Sat"]);
    }

    #[test]
    fn habit_serializes_rule_inline() {
        let habit = Habit::new("user-1", "Read", RecurrenceRule::weekly([2, 4]));
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["target_days"], serde_json::json!([2, 4]));
        let back: Habit = serde_json::from_value(json).unwrap();
        assert_eq!(back, habit);
    }

    #[test]
    fn backdated_habit_reports_creation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let habit = Habit::new("u", "Run", RecurrenceRule::daily()).created_on_date(date);
        assert_eq!(habit.created_on(), date);
        assert!(habit.is_active());
    }
}
