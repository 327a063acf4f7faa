//! Forecasting strategies
//!
//! Every strategy implements [`ForecastStrategy`]; the orchestrator only
//! talks to that trait and never needs the concrete type.

use crate::data::{ExogenousInput, ForecastResult, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::timeframe::Timeframe;
use std::fmt::Debug;

pub mod seasonal_trend;
pub mod stub;
pub mod vector_autoregression;

pub use seasonal_trend::SeasonalTrendStrategy;
pub use stub::PersistenceStrategy;
pub use vector_autoregression::VectorAutoregressionStrategy;

/// Read-only view of one request handed to a strategy
#[derive(Debug, Clone, Copy)]
pub struct ForecastInput<'a> {
    pub timeframe: Timeframe,
    /// Spacing of the future grid in milliseconds
    pub step_ms: i64,
    pub horizon: usize,
    /// Close levels on the candle grid
    pub series: &'a TimeSeries,
    pub exog: &'a ExogenousInput,
}

impl<'a> ForecastInput<'a> {
    /// Input using the timeframe's native grid spacing
    pub fn new(
        timeframe: Timeframe,
        horizon: usize,
        series: &'a TimeSeries,
        exog: &'a ExogenousInput,
    ) -> Self {
        Self {
            timeframe,
            step_ms: timeframe.step().num_milliseconds(),
            horizon,
            series,
            exog,
        }
    }

    pub fn with_step_ms(mut self, step_ms: i64) -> Self {
        self.step_ms = step_ms;
        self
    }

    /// Last observed `(time, price)`
    pub fn last_observation(&self) -> Result<(i64, f64)> {
        self.series.last().ok_or_else(|| {
            ForecastError::InsufficientData("at least one historical point is required".to_string())
        })
    }

    /// `horizon` timestamps strictly after the last observation
    pub fn future_times(&self) -> Result<Vec<i64>> {
        let (last_time, _) = self.last_observation()?;
        Ok((1..=self.horizon as i64)
            .map(|i| last_time + i * self.step_ms)
            .collect())
    }
}

/// Common interface of the forecasting strategies
pub trait ForecastStrategy: Debug + Send + Sync {
    /// Name reported as `method_used`
    fn name(&self) -> &'static str;

    /// Whether the capability behind this strategy is present
    fn is_available(&self) -> bool {
        true
    }

    /// Fit on the input history and forecast `input.horizon` future levels
    fn forecast(&self, input: &ForecastInput<'_>) -> Result<ForecastResult>;
}
