//! Error types for the index regression crate

use thiserror::Error;

/// Result type alias for index regression operations
pub type Result<T> = std::result::Result<T, RegressionError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for RegressionError {
    fn from(err: polars::error::PolarsError) -> Self {
        RegressionError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for RegressionError {
    fn from(err: serde_json::Error) -> Self {
        RegressionError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for RegressionError {
    fn from(err: bincode::Error) -> Self {
        RegressionError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for RegressionError {
    fn from(err: ndarray::ShapeError) -> Self {
        RegressionError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegressionError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RegressionError = io_err.into();
        assert!(matches!(err, RegressionError::IoError(_)));
    }

    #[test]
    fn test_shape_error_display() {
        let err = RegressionError::ShapeError {
            expected: "y length = 5".to_string(),
            actual: "y length = 3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid shape: expected y length = 5, got y length = 3"
        );
    }
}
