//! Core error types for cadence-core.
//!
//! The recurrence evaluator and streak aggregator are infallible; every
//! error here originates in the store, the configuration layer, or
//! creation-time validation of a habit's recurrence rule.

use std::path::PathBuf;
use thiserror::Error;

use crate::habit::Frequency;

/// Core error type for cadence-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// No row for the requested id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
///
/// Raised by creation-time callers only. The evaluator itself treats an
/// invalid rule as one that is never due.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Weekly or monthly rule without any target day
    #[error("Invalid {frequency} recurrence rule: {reason}")]
    InvalidRecurrenceRule {
        frequency: Frequency,
        reason: String,
    },

    /// Target day outside 1-7 (weekly) or 1-31 (monthly)
    #[error("Target day {day} is out of range for a {frequency} habit")]
    TargetDayOutOfRange { frequency: Frequency, day: u8 },

    /// Frequency string not one of daily/weekly/monthly
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_messages_name_the_frequency() {
        let err = ValidationError::InvalidRecurrenceRule {
            frequency: Frequency::Weekly,
            reason: "no target days".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid weekly recurrence rule: no target days"
        );

        let err = ValidationError::TargetDayOutOfRange {
            frequency: Frequency::Monthly,
            day: 32,
        };
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn not_found_wraps_into_core_error() {
        let err: CoreError = DatabaseError::NotFound {
            entity: "habit",
            id: "abc".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Database error: habit not found: abc");
    }

    #[test]
    fn rusqlite_errors_map_to_query_failed() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
