//! Error types for the forecast_engine crate

use thiserror::Error;
use trade_math::MathError;

/// Custom error types for the forecast_engine crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The modeling capability a strategy needs is switched off
    #[error("Strategy unavailable: {0}")]
    Unavailable(String),

    /// Not enough rows or columns to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An exogenous series is empty or lacks time/value fields
    #[error("Malformed series: {0}")]
    MalformedSeries(String),

    /// The request failed boundary validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model fitting or prediction failed numerically
    #[error("Fitting error: {0}")]
    FittingError(String),

    /// Error from the numerical kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Whether the error means "strategy not present" rather than "strategy failed"
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ForecastError::Unavailable(_))
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
