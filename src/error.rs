use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Variable;

pub type Result<T> = std::result::Result<T, QaqcError>;

#[derive(Error, Debug)]
pub enum QaqcError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinate(String),

    #[error("No usable humidity source: vapor pressure, dewpoint, RH max/min and RH average are all missing")]
    DataInsufficient,

    #[error("Value {value} for {parameter} is outside the accepted domain on day {day_index} ({date})")]
    PhysicalRange {
        day_index: usize,
        date: NaiveDate,
        parameter: &'static str,
        value: f64,
    },

    #[error("Series length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Correction of {variable} introduced a missing value on day {day_index}")]
    CorrectionContract { variable: Variable, day_index: usize },

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_range_message_carries_day_context() {
        let err = QaqcError::PhysicalRange {
            day_index: 4,
            date: NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
            parameter: "rs",
            value: -1.5,
        };
        assert_eq!(
            err.to_string(),
            "Value -1.5 for rs is outside the accepted domain on day 4 (2020-01-05)"
        );
    }

    #[test]
    fn test_correction_contract_names_variable() {
        let err = QaqcError::CorrectionContract {
            variable: Variable::TMax,
            day_index: 2,
        };
        assert_eq!(
            err.to_string(),
            "Correction of TMax (C) introduced a missing value on day 2"
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<QaqcError>();
    }
}
