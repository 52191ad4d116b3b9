//! Error types for the forecast_metrics crate

use thiserror::Error;

/// Custom error types for the forecast_metrics crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The supplied dataset has no rows
    #[error("Dataset is empty")]
    EmptyDataset,

    /// The requested column does not exist in the dataset
    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The series is too short for the requested method
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The date column is missing or cannot be interpreted as dates
    #[error("Invalid date column: {0}")]
    InvalidDateColumn(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An iterative model failed to fit
    #[error("Model fit failed: {0}")]
    FitFailure(String),

    /// The method identifier is not recognized
    #[error("Unknown forecast method: {0}")]
    UnknownMethod(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl ForecastError {
    /// Whether the error is a routine data-shape problem that an
    /// orchestrating layer may recover from by switching methods.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForecastError::InsufficientData { .. }
                | ForecastError::InvalidDateColumn(_)
                | ForecastError::FitFailure(_)
        )
    }
}
