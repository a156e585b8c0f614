//! Integration tests for the store-to-aggregator workflow.
//!
//! Habits and completions go through the SQLite store, a bounded snapshot
//! is loaded once, and the aggregator runs against it.

use cadence_core::{
    Config, Database, Habit, RecurrenceRule, StreakAggregator, StreakOptions,
};
use chrono::{Duration, NaiveDate, Utc};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_full_streak_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(dir.path().join("cadence.db")).unwrap();

    // Habits exist from Monday 2024-02-26; tracking starts a week later.
    let created = ymd(2024, 2, 26);
    let start = ymd(2024, 3, 4);
    let today = ymd(2024, 3, 17);

    let water = Habit::new("user-1", "Drink water", RecurrenceRule::daily())
        .created_on_date(created);
    let gym = Habit::new("user-1", "Gym", RecurrenceRule::weekly([2, 4, 6]))
        .created_on_date(created);
    let budget = Habit::new("user-1", "Budget review", RecurrenceRule::monthly([15]))
        .created_on_date(created);
    for h in [&water, &gym, &budget] {
        db.create_habit(h).unwrap();
    }

    for d in start.iter_days().take_while(|d| *d <= today) {
        db.set_completion(&water.id, d, Utc::now()).unwrap();
        if gym.is_due(d) {
            db.set_completion(&gym.id, d, Utc::now()).unwrap();
        }
    }
    db.set_completion(&budget.id, ymd(2024, 3, 15), Utc::now())
        .unwrap();

    let snapshot = db.snapshot(today, 365).unwrap();
    let result = snapshot.stats(StreakOptions::default());
    assert_eq!(result.total_active, 3);
    assert_eq!(result.completed_today, 1);
    assert_eq!(result.current_streak, 14);

    // Unmarking a past gym day breaks the streak after it.
    let toggled = db.toggle_completion(&gym.id, ymd(2024, 3, 13), Utc::now())
        .unwrap();
    assert!(!toggled);
    let snapshot = db.snapshot(today, 365).unwrap();
    let result = snapshot.stats(StreakOptions::default());
    assert_eq!(result.current_streak, 4);

    let floored = snapshot.stats(StreakOptions {
        stop_at_history_start: true,
        ..Default::default()
    });
    assert_eq!(floored.current_streak, 4);
    assert_eq!(floored.longest_streak, 9);

    // Archiving the gym habit removes it from the streak entirely.
    db.archive_habit(&gym.id, Utc::now()).unwrap();
    let result = db.snapshot(today, 365).unwrap().stats(StreakOptions::default());
    assert_eq!(result.total_active, 2);
    assert_eq!(result.current_streak, 14);
}

#[test]
fn test_snapshot_window_limits_history() {
    let db = Database::open_memory().unwrap();
    let today = ymd(2024, 6, 30);
    let habit = Habit::new("user-1", "Journal", RecurrenceRule::daily())
        .created_on_date(today - Duration::days(100));
    db.create_habit(&habit).unwrap();
    for d in (today - Duration::days(100)).iter_days().take(101) {
        db.set_completion(&habit.id, d, Utc::now()).unwrap();
    }

    // Only ten days of completions are loaded, so day eleven looks unsatisfied.
    let snapshot = db.snapshot(today, 10).unwrap();
    let result = snapshot.stats(StreakOptions::default());
    assert_eq!(result.current_streak, 10);
}

#[test]
fn test_config_options_drive_the_aggregator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::load_from(&path).unwrap();
    config.apply("streak.max_days", "7").unwrap();
    config.save_to(&path).unwrap();

    let config = Config::load_from(&path).unwrap();
    let aggregator = StreakAggregator::with_options(config.streak_options());

    let db = Database::open_memory().unwrap();
    let today = ymd(2024, 6, 30);
    let habit = Habit::new("user-1", "Read", RecurrenceRule::daily())
        .created_on_date(today - Duration::days(30));
    db.create_habit(&habit).unwrap();
    for d in (today - Duration::days(30)).iter_days().take(31) {
        db.set_completion(&habit.id, d, Utc::now()).unwrap();
    }
    let snapshot = db.snapshot(today, 365).unwrap();
    let result = aggregator.compute(&snapshot.habits, &snapshot.completions, today);
    assert_eq!(result.current_streak, 7);
    assert_eq!(result.milestone.map(|m| m.days()), Some(7));
}
