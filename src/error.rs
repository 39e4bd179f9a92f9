//! Error types for bocfx
//!
//! Two families live here. [`FxError`] is returned when an operation cannot
//! run at all (I/O, storage, malformed documents). [`Unavailable`] is the
//! explicit "no value" outcome of a computation whose inputs are missing or
//! invalid; callers decide how to surface it.

use thiserror::Error;

/// Main error type for bocfx
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Result type alias for bocfx operations
pub type Result<T> = std::result::Result<T, FxError>;

/// Why a computed figure has no value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// Missing source data, prior day, baseline or non-finite rate
    #[error("unavailable: {0}")]
    NoData(String),

    /// Non-positive or non-finite exposure/baseline supplied by the caller
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Unavailable {
    pub fn no_data(msg: impl Into<String>) -> Self {
        Unavailable::NoData(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Unavailable::InvalidInput(msg.into())
    }
}

/// Outcome of a computation that may legitimately have no value
pub type Availability<T> = std::result::Result<T, Unavailable>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FxError::StorageError("locked".to_string());
        assert_eq!(err.to_string(), "Storage error: locked");

        let err = FxError::InvalidInput("rate must be positive".to_string());
        assert!(err.to_string().contains("rate must be positive"));
    }

    #[test]
    fn test_unavailable_display() {
        assert_eq!(
            Unavailable::no_data("no prior day").to_string(),
            "unavailable: no prior day"
        );
        assert_eq!(
            Unavailable::invalid("exposure must be positive").to_string(),
            "invalid input: exposure must be positive"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FxError = io.into();
        assert!(matches!(err, FxError::IoError(_)));
    }
}
