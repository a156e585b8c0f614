mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DisplayConfig};
pub use database::Database;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::completion::CompletionSet;
use crate::error::Result;
use crate::habit::Habit;
use crate::streak::{StreakAggregator, StreakOptions, StreakResult};

/// Returns the data directory, creating it if needed.
///
/// `CADENCE_DATA_DIR` wins when set. Otherwise `~/.config/cadence[-dev]/`
/// based on `CADENCE_ENV` (set `CADENCE_ENV=dev` for the development dir).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("CADENCE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("CADENCE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("cadence-dev")
            } else {
                base_dir.join("cadence")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Active habits plus a bounded completion window, loaded once.
///
/// Running the aggregator over a snapshot keeps it free of I/O for the
/// whole backward walk.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub today: NaiveDate,
    pub window_start: NaiveDate,
    pub habits: Vec<Habit>,
    pub completions: CompletionSet,
}

impl Snapshot {
    pub fn stats(&self, options: StreakOptions) -> StreakResult {
        StreakAggregator::with_options(options).compute(&self.habits, &self.completions, self.today)
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }
}
