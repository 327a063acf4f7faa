//! # Forecast Engine
//!
//! Short-horizon price forecasting for a single trading symbol.
//!
//! ## Features
//!
//! - Alignment of irregular exogenous series onto the candle grid
//! - Return-based feature engineering (clipped returns, lags, realized volatility)
//! - Seasonal-trend decomposition with changepoints and exogenous regressors
//! - Vector autoregression on returns with AIC lag selection
//! - Time-aligned blending of two forecasts
//! - Graceful degradation to a persistence forecast when a capability is missing
//!
//! ## Timeframes
//!
//! | tf   | default horizon | volatility window |
//! |------|-----------------|-------------------|
//! | `1h` | 24              | 24                |
//! | `4h` | 18              | 6                 |
//! | `1d` | 7               | 7                 |
//!
//! ## Quick Start
//!
//! ```rust
//! use forecast_engine::{Candle, EngineConfig, ForecastRequest, Method, Orchestrator, Timeframe};
//!
//! let candles: Vec<Candle> = (0..60)
//!     .map(|i| Candle::new(i * 3_600_000, 100.0 + i as f64 * 0.1))
//!     .collect();
//! let method = Method::SeasonalTrend;
//! let request = ForecastRequest::new("BTCUSDT", Timeframe::Hourly, method, candles)
//!     .with_horizon(6);
//! request.validate()?;
//!
//! let capabilities = forecast_engine::Capabilities::stub_only();
//! let config = EngineConfig::default().with_capabilities(capabilities);
//! let result = Orchestrator::new(&config).forecast(&request)?;
//!
//! assert_eq!(result.method_used, "Stub");
//! assert_eq!(result.forecast_line.len(), 6);
//! # Ok::<(), forecast_engine::ForecastError>(())
//! ```

pub mod align;
pub mod blend;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod orchestrator;
pub mod request;
pub mod timeframe;

// Re-export commonly used types
pub use crate::align::{align_exogenous, align_to_grid};
pub use crate::blend::blend;
pub use crate::config::{Capabilities, EngineConfig};
pub use crate::data::{
    Candle, ConfidenceBand, ExogenousInput, ForecastPoint, ForecastResult, RawPoint, TimeSeries,
};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{ForecastInput, ForecastStrategy};
pub use crate::orchestrator::Orchestrator;
pub use crate::request::{ErrorResponse, ForecastRequest, ForecastResponse, Method};
pub use crate::timeframe::Timeframe;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
