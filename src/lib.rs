//! # NyxsOwl Forecast
//!
//! Umbrella crate for the forecasting workspace.
//!
//! - [`engine`]: request handling, strategies and orchestration (`forecast_engine`)
//! - [`math`]: numerical kernels shared by the strategies (`trade_math`)
//!
//! ## Example
//!
//! ```
//! use nyxs_forecast_workspace::engine::{
//!     Candle, ForecastRequest, Method, Orchestrator, Timeframe,
//! };
//!
//! let candles = (0..3).map(|i| Candle::new(i * 86_400_000, 10.0 + i as f64)).collect();
//! let method = Method::VectorAutoregression;
//! let request = ForecastRequest::new("BTCUSDT", Timeframe::Daily, method, candles)
//!     .with_horizon(2);
//!
//! // Three candles are too few for a VAR fit.
//! let err = Orchestrator::default().forecast(&request).unwrap_err();
//! assert!(err.to_string().contains("Insufficient data"));
//! ```

pub use forecast_engine as engine;
pub use trade_math as math;
