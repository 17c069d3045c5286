//! Error types for the bodylog_core library.

use chrono::NaiveDate;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bodylog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A measurement failed validation; nothing was written
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// An entry for this date already exists and the policy rejects duplicates
    #[error("An entry for {0} already exists")]
    DuplicateDate(NaiveDate),

    /// Metric name not recognised
    #[error("Unknown metric '{0}' (expected weight, waist or fat)")]
    UnknownMetric(String),

    /// User-supplied date could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The log file exists but is not a measurement log
    #[error("Corrupt measurement log: {0}")]
    CorruptLog(String),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures of the underlying store rather than of user input.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Csv(_) | Error::CorruptLog(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_are_classified() {
        let io = Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert!(io.is_storage_failure());
        assert!(Error::CorruptLog("bad header".into()).is_storage_failure());
        assert!(!Error::InvalidMeasurement("waist".into()).is_storage_failure());
    }

    #[test]
    fn test_messages_are_human_readable() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            Error::DuplicateDate(date).to_string(),
            "An entry for 2024-03-01 already exists"
        );
    }
}
