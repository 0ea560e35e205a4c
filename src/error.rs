//! Error types for studyplan.

use thiserror::Error;

/// Result type for studyplan operations
pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Reading or filtering a course table failed.
    #[error("Course table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    /// The course list JSON is malformed or a required field is absent.
    #[error("Course JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Course table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Course row {row} has no value for '{field}'")]
    MissingField { row: usize, field: String },

    #[error("Course row {row} has an unreadable deadline '{value}'")]
    InvalidDeadline { row: usize, value: String },

    #[error("Course '{0}' is already in the list")]
    DuplicateCourse(String),

    #[error("Course '{0}' not found")]
    UnknownCourse(String),
}
