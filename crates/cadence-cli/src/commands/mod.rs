pub mod config;
pub mod habit;
pub mod stats;
pub mod track;

use cadence_core::Config;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// The given date, or today's UTC calendar date.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// Print `value` as JSON, pretty unless `display.json_pretty` is off.
pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    let config = Config::load_or_default();
    let json = if config.display.json_pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
