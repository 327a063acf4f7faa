//! # Trade Math
//!
//! Numerical kernels shared by the forecasting strategies.
//! This crate works on plain `f64` slices and `nalgebra` matrices and knows
//! nothing about candles, timestamps or requests.
//!
//! - [`returns`]: stationarizing level series into clipped returns, compounding
//!   returns back into a price path and producing look-ahead-free lags
//! - [`moving_averages`]: exponential smoothing and drift extrapolation
//! - [`volatility`]: rolling realized-volatility proxy
//! - [`statistics`]: mean, population deviation and fit-time standardization
//! - [`regression`]: penalized least squares and covariance helpers

use thiserror::Error;

pub mod moving_averages;
pub mod regression;
pub mod returns;
pub mod statistics;
pub mod volatility;

pub use moving_averages::{smoothed_extrapolate, EXOG_SMOOTHING_ALPHA};
pub use returns::{lag, lag_many, to_price_path, to_returns, RETURN_CLIP};
pub use statistics::{mean, population_std, Standardizer};

/// Errors that can occur in numerical calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;
