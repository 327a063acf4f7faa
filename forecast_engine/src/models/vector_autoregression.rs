//! Vector autoregression on returns
//!
//! The target's close prices are turned into clipped returns and modeled
//! jointly with exogenous returns, their lags, the target's own lag and a
//! realized-volatility proxy. The lag order is chosen by AIC, the fitted
//! system is iterated forward and the target's forecast returns are
//! compounded back into a price path.

use crate::align::align_exogenous;
use crate::config::VarConfig;
use crate::data::{ConfidenceBand, ForecastPoint, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::features::{lag, lag_many, to_price_path, to_returns, FeatureTable};
use crate::models::{ForecastInput, ForecastStrategy};
use nalgebra::{DMatrix, DVector};
use tracing::debug;
use trade_math::regression::{least_squares, log_det_psd, residual_covariance};
use trade_math::volatility::rolling_mean_abs;
use trade_math::population_std;

/// Name of the target return column
pub const TARGET_COLUMN: &str = "y";
const VOLATILITY_MIN_PERIODS: usize = 2;

/// Assemble the return-based feature table for `input`.
///
/// Columns: `y` (target returns), then per exogenous feature `{name}_r` and
/// its lags `{name}_r_l{L}`, then `y_lag1` and the rolling mean of absolute
/// target returns `y_vol`. Non-finite entries are replaced by zero.
pub fn build_feature_table(input: &ForecastInput<'_>, config: &VarConfig) -> Result<FeatureTable> {
    let times = input.series.times();
    let y = to_returns(input.series.values());
    let mut table = FeatureTable::new(y.len());
    table.push_column(TARGET_COLUMN, y.clone())?;

    for (name, series) in align_exogenous(times, input.exog) {
        let r = to_returns(series.values());
        let lags = lag_many(&r, &config.return_lags);
        table.push_column(format!("{}_r", name), r)?;
        for (offset, lagged) in lags {
            table.push_column(format!("{}_r_l{}", name, offset), lagged)?;
        }
    }

    table.push_column("y_lag1", lag(&y, 1))?;
    let window = input.timeframe.volatility_window().max(VOLATILITY_MIN_PERIODS);
    table.push_column("y_vol", rolling_mean_abs(&y, window, VOLATILITY_MIN_PERIODS)?)?;

    let replaced = table.sanitize();
    if replaced > 0 {
        debug!(replaced, "replaced non-finite feature values with zero");
    }

    Ok(table)
}

/// AIC of every admissible lag order and the chosen one
#[derive(Debug, Clone, PartialEq)]
pub struct LagOrderSelection {
    pub order: usize,
    pub max_lags: usize,
    /// `(lag order, AIC)` for each order that had enough degrees of freedom
    pub criteria: Vec<(usize, f64)>,
}

/// Regressors `[1, x_{t-1}, ..., x_{t-p}]` and targets `x_t` for `t` in `start..n`
fn lagged_system(data: &DMatrix<f64>, lags: usize, start: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = data.nrows();
    let k = data.ncols();
    let rows = n.saturating_sub(start);

    let design = DMatrix::from_fn(rows, 1 + k * lags, |r, c| {
        if c == 0 {
            return 1.0;
        }
        let lag = (c - 1) / k + 1;
        let col = (c - 1) % k;
        data[(start + r - lag, col)]
    });
    let target = data.rows(start, rows).into_owned();

    (design, target)
}

/// Choose the lag order in `0..=max_lags` minimizing AIC.
///
/// Every order is estimated on the same sample (the rows after `max_lags`)
/// so the criteria are comparable; orders whose regressors would outnumber
/// the observations are skipped.
pub fn select_lag_order(data: &DMatrix<f64>, max_lags: usize) -> Result<LagOrderSelection> {
    let n = data.nrows();
    let k = data.ncols();
    if n <= max_lags {
        return Err(ForecastError::InsufficientData(format!(
            "{} rows cannot support {} lags",
            n, max_lags
        )));
    }
    let nobs = n - max_lags;

    let mut criteria = Vec::with_capacity(max_lags + 1);
    for p in 0..=max_lags {
        let regressors = 1 + k * p;
        if nobs <= regressors {
            continue;
        }

        let (design, target) = lagged_system(data, p, max_lags);
        let coefficients = least_squares(&design, &target)?;
        let residuals = &target - &design * &coefficients;
        let sigma = residual_covariance(&residuals)?;

        let free_params = (p * k * k + k) as f64;
        let aic = log_det_psd(&sigma)? + 2.0 * free_params / nobs as f64;
        criteria.push((p, aic));
    }

    let order = criteria
        .iter()
        .filter(|(_, aic)| aic.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|&(p, _)| p)
        .ok_or_else(|| {
            ForecastError::InsufficientData(format!(
                "no lag order up to {} is estimable from {} rows and {} columns",
                max_lags, n, k
            ))
        })?;

    Ok(LagOrderSelection {
        order,
        max_lags,
        criteria,
    })
}

/// A fitted VAR(p) with constant
#[derive(Debug, Clone)]
pub struct FittedVar {
    lags: usize,
    /// `(1 + k p) x k`: intercepts in row 0, then lag blocks
    coefficients: DMatrix<f64>,
    residuals: DMatrix<f64>,
    /// Last `lags` observations, oldest first
    tail: DMatrix<f64>,
}

impl FittedVar {
    /// Estimate equation by equation with OLS on all rows after the first `lags`
    pub fn fit(data: &DMatrix<f64>, lags: usize) -> Result<Self> {
        let n = data.nrows();
        let k = data.ncols();
        if k == 0 || n <= lags + 1 + k * lags {
            return Err(ForecastError::InsufficientData(format!(
                "{} rows are too few for a {}-variable VAR({})",
                n, k, lags
            )));
        }

        let (design, target) = lagged_system(data, lags, lags);
        let coefficients = least_squares(&design, &target)?;
        let residuals = &target - &design * &coefficients;

        Ok(Self {
            lags,
            coefficients,
            residuals,
            tail: data.rows(n - lags, lags).into_owned(),
        })
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    /// Population standard deviation of one equation's residuals
    pub fn residual_std(&self, column: usize) -> Option<f64> {
        if self.residuals.nrows() == 0 || column >= self.residuals.ncols() {
            return None;
        }
        let resid: Vec<f64> = self.residuals.column(column).iter().copied().collect();
        Some(population_std(&resid))
    }

    /// Iterate the system `steps` periods ahead; rows are steps, columns variables
    pub fn forecast(&self, steps: usize) -> DMatrix<f64> {
        let k = self.coefficients.ncols();
        let mut history: Vec<DVector<f64>> = (0..self.lags)
            .map(|r| self.tail.row(r).transpose())
            .collect();
        let mut out = DMatrix::zeros(steps, k);

        for step in 0..steps {
            let mut next = self.coefficients.row(0).transpose();
            for lag in 1..=self.lags {
                let block = self.coefficients.rows(1 + (lag - 1) * k, k);
                let previous = &history[history.len() - lag];
                next += block.transpose() * previous;
            }
            out.set_row(step, &next.transpose());
            history.push(next);
        }

        out
    }
}

/// Vector autoregression strategy on returns
#[derive(Debug, Clone)]
pub struct VectorAutoregressionStrategy {
    config: VarConfig,
    available: bool,
}

impl VectorAutoregressionStrategy {
    pub const NAME: &'static str = "VarReturns";

    pub fn new(config: VarConfig, available: bool) -> Self {
        Self { config, available }
    }

    /// Search bound scaled to the sample: `min(max_lags, max(2, rows / rows_per_lag))`
    pub fn max_lags_for(&self, rows: usize) -> usize {
        self.config
            .max_lags
            .min((rows / self.config.rows_per_lag).max(2))
    }

    /// Return offset of the confidence band: `band_z` residual deviations,
    /// falling back to `default_resid_std` when no usable deviation exists
    pub fn band_offset(&self, resid_std: Option<f64>) -> f64 {
        let std = resid_std
            .filter(|s| s.is_finite())
            .unwrap_or(self.config.default_resid_std);
        self.config.band_z * std
    }
}

impl Default for VectorAutoregressionStrategy {
    fn default() -> Self {
        Self::new(VarConfig::default(), true)
    }
}

impl ForecastStrategy for VectorAutoregressionStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn forecast(&self, input: &ForecastInput<'_>) -> Result<ForecastResult> {
        if !self.available {
            return Err(ForecastError::Unavailable(
                "vector autoregression is not available".to_string(),
            ));
        }

        let table = build_feature_table(input, &self.config)?;
        if table.n_cols() < 2 || table.n_rows() < self.config.min_rows {
            return Err(ForecastError::InsufficientData(format!(
                "not enough data for VAR on returns: {} rows x {} columns \
                 (need >= {} rows and 2 columns)",
                table.n_rows(),
                table.n_cols(),
                self.config.min_rows
            )));
        }

        let data = table.to_matrix();
        let selection = select_lag_order(&data, self.max_lags_for(table.n_rows()))?;
        let fitted = FittedVar::fit(&data, selection.order)?;
        debug!(
            lags = selection.order,
            max_lags = selection.max_lags,
            columns = table.n_cols(),
            rows = table.n_rows(),
            "fitted VAR on returns"
        );

        let y_idx = table.index_of(TARGET_COLUMN).ok_or_else(|| {
            ForecastError::FittingError("target column missing from feature table".to_string())
        })?;
        let offset = self.band_offset(fitted.residual_std(y_idx));

        let forecast = fitted.forecast(input.horizon);
        let returns: Vec<f64> = forecast.column(y_idx).iter().copied().collect();
        if returns.iter().any(|r| !r.is_finite()) {
            return Err(ForecastError::FittingError(
                "VAR produced non-finite forecast returns".to_string(),
            ));
        }

        let (_, last_price) = input.last_observation()?;
        let times = input.future_times()?;
        let prices = to_price_path(last_price, &returns);

        // The same offset is compounded at every step; the band does not
        // widen with the forecast horizon beyond that compounding.
        let shifted = |delta: f64| returns.iter().map(|r| r + delta).collect::<Vec<_>>();
        let lows = to_price_path(last_price, &shifted(-offset));
        let highs = to_price_path(last_price, &shifted(offset));

        let forecast_line = times
            .iter()
            .zip(&prices)
            .map(|(&time, &value)| ForecastPoint { time, value })
            .collect();
        let confidence = times
            .iter()
            .zip(lows.iter().zip(&highs))
            .map(|(&time, (&low, &high))| ConfidenceBand { time, low, high })
            .collect();

        Ok(ForecastResult::new(Self::NAME, forecast_line, confidence))
    }
}
