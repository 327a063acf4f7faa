//! Engine configuration
//!
//! Capability flags are decided once at process start and treated as
//! immutable afterwards. Tuning sections default to the values the engine was
//! calibrated with; a JSON document may override any subset of them.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which modeling capabilities are present in this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub seasonal_trend: bool,
    pub vector_autoregression: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            seasonal_trend: true,
            vector_autoregression: true,
        }
    }
}

impl Capabilities {
    /// Only the persistence fallback is usable
    pub fn stub_only() -> Self {
        Self {
            seasonal_trend: false,
            vector_autoregression: false,
        }
    }
}

/// Persistence strategy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// Half-width of the band as a fraction of the held price
    pub band_fraction: f64,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            band_fraction: 0.01,
        }
    }
}

/// Seasonal-trend decomposition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalTrendConfig {
    /// Laplace scale of trend changes; higher bends the trend more easily
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub regressor_prior_scale: f64,
    pub n_changepoints: usize,
    /// Share of history (from the start) where changepoints may be placed
    pub changepoint_range: f64,
    /// Coverage of the prediction interval
    pub interval_width: f64,
    pub yearly_order: usize,
    pub weekly_order: usize,
    pub daily_order: usize,
    pub monthly_period_days: f64,
    pub monthly_order: usize,
    /// Full periods of history a seasonality needs before it is fitted
    pub min_seasonal_cycles: f64,
    /// Reweighting passes of the MAP fit
    pub fit_iterations: usize,
}

impl Default for SeasonalTrendConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.2,
            seasonality_prior_scale: 5.0,
            regressor_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            interval_width: 0.8,
            yearly_order: 10,
            weekly_order: 3,
            daily_order: 4,
            monthly_period_days: 30.5,
            monthly_order: 5,
            min_seasonal_cycles: 2.0,
            fit_iterations: 4,
        }
    }
}

/// Vector autoregression settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarConfig {
    /// Upper bound of the lag-order search
    pub max_lags: usize,
    /// Rows required per searched lag
    pub rows_per_lag: usize,
    pub min_rows: usize,
    /// Residual deviation used when the fit exposes no residuals
    pub default_resid_std: f64,
    /// Multiplier of the residual deviation in the band
    pub band_z: f64,
    /// Lags added for every exogenous return series
    pub return_lags: Vec<usize>,
}

impl Default for VarConfig {
    fn default() -> Self {
        Self {
            max_lags: 8,
            rows_per_lag: 20,
            min_rows: 120,
            default_resid_std: 0.02,
            band_z: 1.96,
            return_lags: vec![1, 2, 3],
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub capabilities: Capabilities,
    pub stub: StubConfig,
    pub seasonal_trend: SeasonalTrendConfig,
    pub vector_autoregression: VarConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Reject settings no strategy can work with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> {
            Err(ForecastError::InvalidRequest(msg.to_string()))
        };

        if !(self.stub.band_fraction >= 0.0 && self.stub.band_fraction < 1.0) {
            return invalid("stub.band_fraction must be in [0, 1)");
        }

        let st = &self.seasonal_trend;
        if !(st.changepoint_prior_scale > 0.0
            && st.seasonality_prior_scale > 0.0
            && st.regressor_prior_scale > 0.0)
        {
            return invalid("seasonal_trend prior scales must be positive");
        }
        if !(st.changepoint_range > 0.0 && st.changepoint_range <= 1.0) {
            return invalid("seasonal_trend.changepoint_range must be in (0, 1]");
        }
        if !(st.interval_width > 0.0 && st.interval_width < 1.0) {
            return invalid("seasonal_trend.interval_width must be in (0, 1)");
        }
        if st.monthly_period_days <= 0.0 {
            return invalid("seasonal_trend.monthly_period_days must be positive");
        }
        if !(st.min_seasonal_cycles >= 0.0) {
            return invalid("seasonal_trend.min_seasonal_cycles must be non-negative");
        }
        if st.fit_iterations == 0 {
            return invalid("seasonal_trend.fit_iterations must be at least 1");
        }

        let var = &self.vector_autoregression;
        if var.max_lags == 0 || var.rows_per_lag == 0 {
            return invalid("vector_autoregression.max_lags and rows_per_lag must be positive");
        }
        if var.min_rows < 2 {
            return invalid("vector_autoregression.min_rows must be at least 2");
        }
        if !(var.default_resid_std >= 0.0 && var.band_z >= 0.0) {
            return invalid("vector_autoregression band parameters must be non-negative");
        }
        if var.return_lags.iter().any(|&l| l == 0) {
            return invalid("vector_autoregression.return_lags must be positive");
        }

        Ok(())
    }
}
