//! Error types shared by the planner, the workflows and config loading.

use crate::driver::DriverError;

/// Errors that abort planning.
///
/// Every variant is fatal. Liquid that has already been dispensed cannot be
/// taken back, so nothing is retried and nothing is issued to the driver for
/// a plan that fails validation.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Invalid mount assignment, plate count, plate type or other option
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A volume outside the bounds declared for its pass or tool
    #[error("Volume out of range: {volume} uL for {context} (allowed {min}-{max} uL)")]
    VolumeOutOfRange {
        /// Offending volume in µL
        volume: f64,
        /// Lowest accepted volume
        min: f64,
        /// Highest accepted volume
        max: f64,
        /// Which pass or record the volume belongs to
        context: String,
    },

    /// A table row that cannot be turned into a record
    #[error("Malformed row at line {line}: {message}")]
    MalformedRow {
        /// One-based line number within the raw table
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// The hardware driver rejected a command
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// I/O error reading a config or table file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PlanError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        PlanError::Configuration(message.into())
    }

    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        PlanError::MalformedRow {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PlanError>;
