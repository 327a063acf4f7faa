//! Strategy selection, degradation and blending

use crate::blend::blend;
use crate::config::{Capabilities, EngineConfig};
use crate::data::{ForecastPoint, ForecastResult};
use crate::error::Result;
use crate::models::{
    ForecastInput, ForecastStrategy, PersistenceStrategy, SeasonalTrendStrategy,
    VectorAutoregressionStrategy,
};
use crate::request::{ForecastRequest, Method};
use tracing::{info, warn};

/// Runs the requested method, substituting the persistence strategy when a
/// capability is missing.
///
/// Outside of blending, failures other than unavailability are returned to
/// the caller unchanged. Inside a blend, a failing part is dropped.
#[derive(Debug)]
pub struct Orchestrator {
    stub: Box<dyn ForecastStrategy>,
    seasonal_trend: Box<dyn ForecastStrategy>,
    vector_autoregression: Box<dyn ForecastStrategy>,
}

impl Orchestrator {
    /// `method_used` of blended output
    pub const BLEND_NAME: &'static str = "Blend";

    pub fn new(config: &EngineConfig) -> Self {
        Self {
            stub: Box::new(PersistenceStrategy::new(&config.stub)),
            seasonal_trend: Box::new(SeasonalTrendStrategy::new(
                config.seasonal_trend.clone(),
                config.capabilities.seasonal_trend,
            )),
            vector_autoregression: Box::new(VectorAutoregressionStrategy::new(
                config.vector_autoregression.clone(),
                config.capabilities.vector_autoregression,
            )),
        }
    }

    /// Assemble from arbitrary strategies; availability comes from each strategy
    pub fn with_strategies(
        stub: Box<dyn ForecastStrategy>,
        seasonal_trend: Box<dyn ForecastStrategy>,
        vector_autoregression: Box<dyn ForecastStrategy>,
    ) -> Self {
        Self {
            stub,
            seasonal_trend,
            vector_autoregression,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            seasonal_trend: self.seasonal_trend.is_available(),
            vector_autoregression: self.vector_autoregression.is_available(),
        }
    }

    /// Forecast a request at its resolved horizon on the timeframe's grid
    #[tracing::instrument(
        skip_all,
        fields(symbol = %request.symbol, timeframe = %request.timeframe, method = %request.method)
    )]
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let series = request.series();
        let input = ForecastInput::new(
            request.timeframe,
            request.resolved_horizon(),
            &series,
            &request.exog,
        );

        let result = self.run(request.method, &input)?;
        info!(
            method_used = %result.method_used,
            points = result.forecast_line.len(),
            "forecast complete"
        );
        Ok(result)
    }

    /// Execute `method` on a prepared input
    pub fn run(&self, method: Method, input: &ForecastInput<'_>) -> Result<ForecastResult> {
        match method {
            Method::SeasonalTrend => self.run_or_degrade(self.seasonal_trend.as_ref(), input),
            Method::VectorAutoregression => {
                self.run_or_degrade(self.vector_autoregression.as_ref(), input)
            }
            Method::Blend => self.run_blend(input),
        }
    }

    fn run_or_degrade(
        &self,
        strategy: &dyn ForecastStrategy,
        input: &ForecastInput<'_>,
    ) -> Result<ForecastResult> {
        if !strategy.is_available() {
            warn!(requested = strategy.name(), "strategy unavailable, degrading to stub");
            return self.stub.forecast(input);
        }

        match strategy.forecast(input) {
            Err(e) if e.is_unavailable() => {
                warn!(
                    requested = strategy.name(),
                    error = %e,
                    "strategy unavailable, degrading to stub"
                );
                self.stub.forecast(input)
            }
            other => other,
        }
    }

    fn run_blend(&self, input: &ForecastInput<'_>) -> Result<ForecastResult> {
        let mut parts: Vec<Vec<ForecastPoint>> = Vec::with_capacity(2);

        let first = if self.seasonal_trend.is_available() {
            self.seasonal_trend.as_ref()
        } else {
            self.stub.as_ref()
        };
        let mut candidates = vec![first];
        if self.vector_autoregression.is_available() {
            candidates.push(self.vector_autoregression.as_ref());
        }

        for strategy in candidates {
            match strategy.forecast(input) {
                Ok(result) => parts.push(result.forecast_line),
                Err(e) => {
                    warn!(part = strategy.name(), error = %e, "blend part failed, omitting it")
                }
            }
        }

        let forecast_line = match parts.as_slice() {
            [] => {
                warn!("no blend part succeeded, degrading to stub");
                return self.stub.forecast(input);
            }
            [only] => only.clone(),
            [a, b, ..] => blend(a, b),
        };

        Ok(ForecastResult::new(Self::BLEND_NAME, forecast_line, Vec::new()))
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
