//! Error types for the capacity engine.
//!
//! Only malformed input is an error. Ordinary data variance (zero capacity,
//! short windows, missing profiles, stack overflow) is reported through
//! result values instead.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// A learning-curve profile the projector cannot evaluate.
///
/// Raised by the projector and absorbed by the allocator, which falls back
/// to a flat daily rate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidProfile {
    /// The profile has no curve points.
    #[error("learning curve has no points")]
    EmptyPoints,

    /// Standard minute value must be strictly positive.
    #[error("standard minute value must be positive, got {0}")]
    NonPositiveSmv(f64),

    /// Working minutes per operator-day must be strictly positive.
    #[error("working minutes per day must be positive, got {0}")]
    NonPositiveWorkingMinutes(f64),

    /// At least one operator is required.
    #[error("operator count must be at least 1")]
    NoOperators,

    /// A point carries a zero, negative or non-finite efficiency.
    #[error("point {index} has invalid efficiency {efficiency}%")]
    InvalidEfficiency { index: usize, efficiency: f64 },

    /// A point carries a NaN or infinite threshold.
    #[error("point {index} has non-finite threshold {threshold}")]
    NonFiniteThreshold { index: usize, threshold: f64 },

    /// Thresholds must be non-decreasing.
    #[error("point {index} threshold {threshold} is below its predecessor")]
    UnorderedThreshold { index: usize, threshold: f64 },
}

/// Errors raised by the planning board.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Request rejected before allocation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown task '{0}'")]
    UnknownTask(String),

    /// The calendar blocks the requested start date.
    #[error("start date {date} is blocked on resource '{resource_id}'")]
    BlockedStartDate {
        resource_id: String,
        date: NaiveDate,
    },

    /// Tasks can only merge when they share an order and a resource.
    #[error("tasks '{first}' and '{second}' cannot be merged: {reason}")]
    IncompatibleMerge {
        first: String,
        second: String,
        reason: String,
    },

    /// The split date leaves one side without any planned quantity.
    #[error("splitting task '{task_id}' at {at} leaves an empty part")]
    SplitOutOfRange { task_id: String, at: NaiveDate },
}

/// Engine configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for board operations.
pub type Result<T, E = BoardError> = std::result::Result<T, E>;
