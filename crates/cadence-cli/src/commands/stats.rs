use cadence_core::{format_streak, Config, Database, StreakAggregator, StreakResult};
use chrono::NaiveDate;
use serde::Serialize;

use super::{date_or_today, print_json, CommandResult};

#[derive(Serialize)]
struct StatsOutput {
    date: NaiveDate,
    #[serde(flatten)]
    result: StreakResult,
    completion_ratio: f64,
    streak_label: String,
}

pub fn stats(date: Option<NaiveDate>) -> CommandResult {
    let config = Config::load()?;
    let options = config.streak_options();
    let today = date_or_today(date);

    let db = Database::open()?;
    let snapshot = db.snapshot(today, options.effective_max_days())?;
    let result = snapshot.stats(options);

    print_json(&StatsOutput {
        date: today,
        completion_ratio: result.completion_ratio(),
        streak_label: format_streak(result.current_streak),
        result,
    })
}

pub fn history(days: u32, date: Option<NaiveDate>) -> CommandResult {
    let config = Config::load()?;
    let today = date_or_today(date);

    let db = Database::open()?;
    let snapshot = db.snapshot(today, days)?;
    let reports = StreakAggregator::with_options(config.streak_options()).history(
        &snapshot.habits,
        &snapshot.completions,
        today,
        days,
    );

    print_json(&reports)
}
