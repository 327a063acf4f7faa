//! Seasonal-trend decomposition forecaster
//!
//! The level series is modeled as
//!
//! ```text
//! additive:        y(t) = g(t) + s(t) + x(t)
//! multiplicative:  y(t) = g(t) * (1 + s(t) + x(t))
//! ```
//!
//! where `g` is a piecewise-linear trend with automatically placed
//! changepoints, `s` a sum of Fourier seasonalities and `x` a linear
//! combination of standardized exogenous regressors. Coefficients are MAP
//! estimates: trend changes carry a Laplace prior (fitted by iteratively
//! reweighted ridge), seasonal and regressor coefficients Gaussian priors.
//!
//! The prediction interval adds the residual noise to the uncertainty of
//! future trend changes, simulated analytically from the changepoint rate
//! and magnitude seen in history.

use crate::align::align_exogenous;
use crate::config::SeasonalTrendConfig;
use crate::data::{ConfidenceBand, ForecastPoint, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::features::smoothed_extrapolate;
use crate::models::{ForecastInput, ForecastStrategy};
use crate::timeframe::Timeframe;
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::debug;
use trade_math::regression::penalized_least_squares;
use trade_math::Standardizer;

const MS_PER_DAY: f64 = 86_400_000.0;
/// Lower bound of the residual variance in scaled units
const SIGMA2_FLOOR: f64 = 1e-6;
/// Smallest |delta| used when reweighting the Laplace prior
const LAPLACE_DELTA_FLOOR: f64 = 1e-4;
/// Prior scale of the trend intercept and base slope
const TREND_BASE_PRIOR_SCALE: f64 = 5.0;

/// How seasonal and regressor components combine with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    Additive,
    /// Components scale with the trend level
    Multiplicative,
}

/// A Fourier seasonal component
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    pub period_days: f64,
    pub order: usize,
}

impl Seasonality {
    fn columns(&self) -> usize {
        2 * self.order
    }

    /// Append `sin, cos` pairs for harmonics `1..=order` at `t_days`
    fn features_into(&self, t_days: f64, row: &mut Vec<f64>) {
        for n in 1..=self.order {
            let angle = 2.0 * PI * n as f64 * t_days / self.period_days;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
}

/// A standardized exogenous regressor and its fit-time constants
#[derive(Debug, Clone)]
pub struct Regressor {
    pub name: String,
    pub standardizer: Standardizer,
    /// Standardized values on the history grid
    pub values: Vec<f64>,
}

impl Regressor {
    /// Standardize aligned levels, keeping the constants for future values
    pub fn from_levels(name: impl Into<String>, levels: &[f64]) -> Result<Self> {
        let standardizer = Standardizer::fit(levels)?;
        Ok(Self {
            name: name.into(),
            values: standardizer.transform(levels),
            standardizer,
        })
    }

    /// Future standardized values from a smoothed drift continuation of the
    /// de-standardized history, scaled with the fit-time constants.
    pub fn extrapolate(&self, steps: usize) -> Vec<f64> {
        let history = self.standardizer.inverse(&self.values);
        let future_levels = smoothed_extrapolate(&history, steps);
        self.standardizer.transform(&future_levels)
    }
}

#[derive(Debug, Clone, Copy)]
enum Prior {
    Gaussian(f64),
    Laplace(f64),
}

/// Unfitted model description
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    config: SeasonalTrendConfig,
    mode: SeasonalityMode,
    seasonalities: Vec<Seasonality>,
}

impl SeasonalTrendModel {
    /// Seasonal setup for a timeframe.
    ///
    /// Every timeframe gets yearly and weekly cycles. Intraday timeframes add
    /// a daily cycle; the daily timeframe switches to multiplicative mode and
    /// adds a monthly cycle instead.
    pub fn for_timeframe(config: &SeasonalTrendConfig, timeframe: Timeframe) -> Self {
        let mut seasonalities = vec![
            Seasonality {
                name: "yearly",
                period_days: 365.25,
                order: config.yearly_order,
            },
            Seasonality {
                name: "weekly",
                period_days: 7.0,
                order: config.weekly_order,
            },
        ];

        let mode = if timeframe.is_intraday() {
            seasonalities.push(Seasonality {
                name: "daily",
                period_days: 1.0,
                order: config.daily_order,
            });
            SeasonalityMode::Additive
        } else {
            seasonalities.push(Seasonality {
                name: "monthly",
                period_days: config.monthly_period_days,
                order: config.monthly_order,
            });
            SeasonalityMode::Multiplicative
        };
        seasonalities.retain(|s| s.order > 0);

        Self {
            config: config.clone(),
            mode,
            seasonalities,
        }
    }

    pub fn mode(&self) -> SeasonalityMode {
        self.mode
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    /// Fit on `(times, y)` with optional regressors sampled on `times`
    pub fn fit(
        &self,
        times: &[i64],
        y: &[f64],
        regressors: &[Regressor],
    ) -> Result<FittedSeasonalTrend> {
        let n = times.len();
        if n != y.len() {
            return Err(ForecastError::InvalidRequest(format!(
                "Times length ({}) doesn't match values length ({})",
                n,
                y.len()
            )));
        }
        if n < 2 {
            return Err(ForecastError::InsufficientData(
                "seasonal-trend fit needs at least 2 observations".to_string(),
            ));
        }
        if let Some(r) = regressors.iter().find(|r| r.values.len() != n) {
            return Err(ForecastError::InvalidRequest(format!(
                "Regressor '{}' has {} rows, history has {}",
                r.name,
                r.values.len(),
                n
            )));
        }

        let t_start = times[0];
        let t_span = (times[n - 1] - t_start) as f64;
        if !(t_span > 0.0) {
            return Err(ForecastError::InsufficientData(
                "history must span a positive time range".to_string(),
            ));
        }

        let y_scale = y.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let y_scale = if y_scale > 0.0 && y_scale.is_finite() { y_scale } else { 1.0 };
        let y_scaled = DVector::from_iterator(n, y.iter().map(|v| v / y_scale));

        let t: Vec<f64> = times.iter().map(|&ms| (ms - t_start) as f64 / t_span).collect();
        let changepoints = self.changepoints(&t);
        let seasonalities = self.active_seasonalities(t_span / MS_PER_DAY);

        let mut fitted = FittedSeasonalTrend {
            mode: self.mode,
            seasonalities,
            regressor_names: regressors.iter().map(|r| r.name.clone()).collect(),
            t_start,
            t_span,
            y_scale,
            changepoints,
            trend_coefficients: Vec::new(),
            component_coefficients: Vec::new(),
            sigma_obs: 0.0,
            z: interval_z(self.config.interval_width)?,
        };

        let trend_design = fitted.trend_design(&t);
        let component_design = fitted.component_design(times, |i, j| regressors[j].values[i]);
        let trend_cols = trend_design.ncols();

        match self.mode {
            SeasonalityMode::Additive => {
                let design = hstack(&trend_design, &component_design);
                let mut priors = self.trend_priors(trend_cols);
                priors.extend(self.component_priors(&fitted.seasonalities, regressors.len()));

                let beta = fit_map(&design, &y_scaled, &priors, self.config.fit_iterations)?;
                fitted.trend_coefficients = beta.rows(0, trend_cols).iter().copied().collect();
                fitted.component_coefficients =
                    beta.rows(trend_cols, beta.len() - trend_cols).iter().copied().collect();
            }
            SeasonalityMode::Multiplicative => {
                let priors = self.trend_priors(trend_cols);
                let iterations = self.config.fit_iterations;
                let trend_beta = fit_map(&trend_design, &y_scaled, &priors, iterations)?;
                let trend = &trend_design * &trend_beta;
                if trend.iter().any(|g| !(*g > 0.0)) {
                    return Err(ForecastError::FittingError(
                        "trend is not strictly positive; multiplicative components are undefined"
                            .to_string(),
                    ));
                }
                fitted.trend_coefficients = trend_beta.iter().copied().collect();

                if component_design.ncols() > 0 {
                    let relative = DVector::from_fn(n, |i, _| y_scaled[i] / trend[i] - 1.0);
                    let priors = self.component_priors(&fitted.seasonalities, regressors.len());
                    let beta =
                        fit_map(&component_design, &relative, &priors, self.config.fit_iterations)?;
                    fitted.component_coefficients = beta.iter().copied().collect();
                }
            }
        }

        let in_sample = fitted.evaluate_scaled(times, |i, j| regressors[j].values[i])?;
        let mse = in_sample
            .iter()
            .zip(y_scaled.iter())
            .map(|((yhat, _), y)| (y - yhat).powi(2))
            .sum::<f64>()
            / n as f64;
        fitted.sigma_obs = mse.sqrt();

        debug!(
            mode = ?self.mode,
            changepoints = fitted.changepoints.len(),
            regressors = regressors.len(),
            sigma_obs = fitted.sigma_obs * y_scale,
            "fitted seasonal-trend model"
        );

        Ok(fitted)
    }

    /// Changepoint locations (scaled time), evenly spread over the first
    /// `changepoint_range` share of the history rows
    fn changepoints(&self, t: &[f64]) -> Vec<f64> {
        let hist_size = (t.len() as f64 * self.config.changepoint_range).floor() as usize;
        let n_changepoints = self.config.n_changepoints.min(hist_size.saturating_sub(1));
        if n_changepoints == 0 {
            return Vec::new();
        }

        let last = (hist_size - 1) as f64;
        let mut points: Vec<f64> = (1..=n_changepoints)
            .map(|i| {
                let idx = (i as f64 * last / n_changepoints as f64).round() as usize;
                t[idx.min(t.len() - 1)]
            })
            .collect();
        points.dedup();
        points
    }

    fn trend_priors(&self, trend_cols: usize) -> Vec<Prior> {
        let mut priors = vec![Prior::Gaussian(TREND_BASE_PRIOR_SCALE); 2];
        priors.extend(
            std::iter::repeat(Prior::Laplace(self.config.changepoint_prior_scale))
                .take(trend_cols.saturating_sub(2)),
        );
        priors
    }

    /// Seasonalities whose period the history covers at least
    /// `min_seasonal_cycles` times; shorter histories cannot identify them
    fn active_seasonalities(&self, span_days: f64) -> Vec<Seasonality> {
        self.seasonalities
            .iter()
            .filter(|s| span_days >= self.config.min_seasonal_cycles * s.period_days)
            .cloned()
            .collect()
    }

    fn component_priors(&self, seasonalities: &[Seasonality], n_regressors: usize) -> Vec<Prior> {
        let seasonal_cols: usize = seasonalities.iter().map(Seasonality::columns).sum();
        let mut priors = vec![Prior::Gaussian(self.config.seasonality_prior_scale); seasonal_cols];
        priors.extend(vec![
            Prior::Gaussian(self.config.regressor_prior_scale);
            n_regressors
        ]);
        priors
    }
}

/// A fitted seasonal-trend model, ready to predict
#[derive(Debug, Clone)]
pub struct FittedSeasonalTrend {
    mode: SeasonalityMode,
    seasonalities: Vec<Seasonality>,
    regressor_names: Vec<String>,
    t_start: i64,
    t_span: f64,
    y_scale: f64,
    /// Scaled-time changepoint locations
    changepoints: Vec<f64>,
    /// Intercept, base slope, then one delta per changepoint
    trend_coefficients: Vec<f64>,
    /// Fourier coefficients followed by regressor coefficients
    component_coefficients: Vec<f64>,
    /// Residual deviation in scaled units
    sigma_obs: f64,
    z: f64,
}

/// One predicted level with its interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub time: i64,
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
    pub trend: f64,
}

impl FittedSeasonalTrend {
    pub fn mode(&self) -> SeasonalityMode {
        self.mode
    }

    pub fn regressor_names(&self) -> &[String] {
        &self.regressor_names
    }

    /// Residual standard deviation in price units
    pub fn residual_std(&self) -> f64 {
        self.sigma_obs * self.y_scale
    }

    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    /// Names of the seasonal components the history was long enough for
    pub fn seasonality_names(&self) -> Vec<&'static str> {
        self.seasonalities.iter().map(|s| s.name).collect()
    }

    /// Predict at `times`; `future_regressors[j]` holds standardized values of
    /// regressor `j` for every time.
    pub fn predict(
        &self,
        times: &[i64],
        future_regressors: &[Vec<f64>],
    ) -> Result<Vec<Prediction>> {
        if future_regressors.len() != self.regressor_names.len() {
            return Err(ForecastError::InvalidRequest(format!(
                "Model has {} regressors, {} future series were given",
                self.regressor_names.len(),
                future_regressors.len()
            )));
        }
        if let Some(j) = future_regressors.iter().position(|r| r.len() != times.len()) {
            return Err(ForecastError::InvalidRequest(format!(
                "Future values of regressor '{}' have {} rows, expected {}",
                self.regressor_names[j],
                future_regressors[j].len(),
                times.len()
            )));
        }

        let evaluated = self.evaluate_scaled(times, |i, j| future_regressors[j][i])?;
        let trend_variance = self.trend_change_variance();

        Ok(times
            .iter()
            .zip(evaluated)
            .map(|(&time, (yhat, trend))| {
                let tau = (self.scaled_time(time) - 1.0).max(0.0);
                let drift_var = trend_variance * tau.powi(3) / 3.0;
                let drift_var = match self.mode {
                    SeasonalityMode::Additive => drift_var,
                    SeasonalityMode::Multiplicative if trend != 0.0 => {
                        drift_var * (yhat / trend).powi(2)
                    }
                    SeasonalityMode::Multiplicative => drift_var,
                };
                let sd = (self.sigma_obs.powi(2) + drift_var).sqrt();

                Prediction {
                    time,
                    yhat: yhat * self.y_scale,
                    lower: (yhat - self.z * sd) * self.y_scale,
                    upper: (yhat + self.z * sd) * self.y_scale,
                    trend: trend * self.y_scale,
                }
            })
            .collect())
    }

    fn scaled_time(&self, ms: i64) -> f64 {
        (ms - self.t_start) as f64 / self.t_span
    }

    /// Rate-weighted second moment of trend changes per unit scaled time.
    ///
    /// Future changes arrive at the historical changepoint rate with Laplace
    /// magnitudes of the historical mean |delta|, so the trend offset at
    /// horizon `tau` has variance `rate * 2 b^2 * tau^3 / 3`.
    fn trend_change_variance(&self) -> f64 {
        let deltas = self.trend_coefficients.get(2..).unwrap_or(&[]);
        if deltas.is_empty() {
            return 0.0;
        }
        let rate = self.changepoints.len() as f64;
        let b = deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64;
        rate * 2.0 * b * b
    }

    /// `[1, t, (t - c_j)+ ...]` for every scaled time
    fn trend_design(&self, t: &[f64]) -> DMatrix<f64> {
        let cols = 2 + self.changepoints.len();
        DMatrix::from_fn(t.len(), cols, |i, j| match j {
            0 => 1.0,
            1 => t[i],
            _ => (t[i] - self.changepoints[j - 2]).max(0.0),
        })
    }

    /// Fourier features followed by regressor values from `regressor(i, j)`
    fn component_design<F>(&self, times: &[i64], regressor: F) -> DMatrix<f64>
    where
        F: Fn(usize, usize) -> f64,
    {
        let seasonal_cols: usize = self.seasonalities.iter().map(Seasonality::columns).sum();
        let cols = seasonal_cols + self.regressor_names.len();

        let mut data = Vec::with_capacity(times.len() * cols);
        for (i, &ms) in times.iter().enumerate() {
            let t_days = ms as f64 / MS_PER_DAY;
            let mut row = Vec::with_capacity(cols);
            for seasonality in &self.seasonalities {
                seasonality.features_into(t_days, &mut row);
            }
            for j in 0..self.regressor_names.len() {
                row.push(regressor(i, j));
            }
            data.extend(row);
        }

        DMatrix::from_row_slice(times.len(), cols, &data)
    }

    /// Scaled `(yhat, trend)` at each time
    fn evaluate_scaled<F>(&self, times: &[i64], regressor: F) -> Result<Vec<(f64, f64)>>
    where
        F: Fn(usize, usize) -> f64,
    {
        let t: Vec<f64> = times.iter().map(|&ms| self.scaled_time(ms)).collect();
        let trend_design = self.trend_design(&t);
        if trend_design.ncols() != self.trend_coefficients.len() {
            return Err(ForecastError::FittingError(
                "trend coefficients are missing".to_string(),
            ));
        }
        let trend = &trend_design * DVector::from_column_slice(&self.trend_coefficients);

        let component_design = self.component_design(times, regressor);
        let components = if component_design.ncols() == 0 {
            DVector::zeros(times.len())
        } else if component_design.ncols() == self.component_coefficients.len() {
            &component_design * DVector::from_column_slice(&self.component_coefficients)
        } else {
            return Err(ForecastError::FittingError(
                "component coefficients are missing".to_string(),
            ));
        };

        Ok(trend
            .iter()
            .zip(components.iter())
            .map(|(&g, &s)| match self.mode {
                SeasonalityMode::Additive => (g + s, g),
                SeasonalityMode::Multiplicative => (g * (1.0 + s), g),
            })
            .collect())
    }
}

/// Two-sided standard normal quantile for an interval of coverage `width`
fn interval_z(width: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::FittingError(e.to_string()))?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}

fn hstack(left: &DMatrix<f64>, right: &DMatrix<f64>) -> DMatrix<f64> {
    let lc = left.ncols();
    DMatrix::from_fn(left.nrows(), lc + right.ncols(), |i, j| {
        if j < lc {
            left[(i, j)]
        } else {
            right[(i, j - lc)]
        }
    })
}

/// MAP estimate under per-coefficient priors.
///
/// Each pass turns the priors into ridge penalties relative to the current
/// residual variance; Laplace priors are majorized by a quadratic around the
/// previous estimate.
fn fit_map(
    design: &DMatrix<f64>,
    target: &DVector<f64>,
    priors: &[Prior],
    iterations: usize,
) -> Result<DVector<f64>> {
    let n = target.len() as f64;
    let target_mean = target.mean();
    let mut sigma2 = (target.iter().map(|v| (v - target_mean).powi(2)).sum::<f64>() / n)
        .max(SIGMA2_FLOOR);

    let max_diag = (0..design.ncols())
        .map(|j| design.column(j).norm_squared())
        .fold(0.0_f64, f64::max);
    let penalty_floor = (max_diag * 1e-10).max(1e-12);

    let mut beta: Option<DVector<f64>> = None;
    for _ in 0..iterations.max(1) {
        let penalties: Vec<f64> = priors
            .iter()
            .enumerate()
            .map(|(j, prior)| {
                let p = match (*prior, &beta) {
                    (Prior::Gaussian(scale), _) => sigma2 / (scale * scale),
                    (Prior::Laplace(scale), None) => sigma2 / (2.0 * scale * scale),
                    (Prior::Laplace(scale), Some(b)) => {
                        sigma2 / (scale * b[j].abs().max(LAPLACE_DELTA_FLOOR))
                    }
                };
                p.max(penalty_floor)
            })
            .collect();

        let estimate = penalized_least_squares(design, target, &penalties)?;
        let residuals = target - design * &estimate;
        sigma2 = (residuals.norm_squared() / n).max(SIGMA2_FLOOR);
        beta = Some(estimate);
    }

    beta.ok_or_else(|| ForecastError::FittingError("no fit iterations were run".to_string()))
}

/// Seasonal-trend decomposition strategy
#[derive(Debug, Clone)]
pub struct SeasonalTrendStrategy {
    config: SeasonalTrendConfig,
    available: bool,
}

impl SeasonalTrendStrategy {
    pub const NAME: &'static str = "SeasonalTrend";

    pub fn new(config: SeasonalTrendConfig, available: bool) -> Self {
        Self { config, available }
    }
}

impl Default for SeasonalTrendStrategy {
    fn default() -> Self {
        Self::new(SeasonalTrendConfig::default(), true)
    }
}

impl ForecastStrategy for SeasonalTrendStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn forecast(&self, input: &ForecastInput<'_>) -> Result<ForecastResult> {
        if !self.available {
            return Err(ForecastError::Unavailable(
                "seasonal-trend decomposition is not available".to_string(),
            ));
        }

        let times = input.series.times();
        let regressors = align_exogenous(times, input.exog)
            .into_iter()
            .map(|(name, series)| Regressor::from_levels(name, series.values()))
            .collect::<Result<Vec<_>>>()?;

        let model = SeasonalTrendModel::for_timeframe(&self.config, input.timeframe);
        let fitted = model.fit(times, input.series.values(), &regressors)?;

        let future_times = input.future_times()?;
        let future_regressors: Vec<Vec<f64>> = regressors
            .iter()
            .map(|r| r.extrapolate(future_times.len()))
            .collect();

        let predictions = fitted.predict(&future_times, &future_regressors)?;
        let forecast_line = predictions
            .iter()
            .map(|p| ForecastPoint {
                time: p.time,
                value: p.yhat,
            })
            .collect();
        let confidence = predictions
            .iter()
            .map(|p| ConfidenceBand {
                time: p.time,
                low: p.lower,
                high: p.upper,
            })
            .collect();

        Ok(ForecastResult::new(Self::NAME, forecast_line, confidence))
    }
}
