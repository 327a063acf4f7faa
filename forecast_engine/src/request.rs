//! Request and response shapes at the engine boundary

use crate::data::{
    deserialize_exogenous, Candle, ConfidenceBand, ExogenousInput, ForecastPoint, ForecastResult,
    TimeSeries,
};
use crate::error::{ForecastError, Result};
use crate::timeframe::Timeframe;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fewest candles a request may carry
pub const MIN_CANDLES: usize = 50;

/// Forecasting method requested by the caller.
///
/// Names are matched case-insensitively; `prophet` and `var` are accepted as
/// aliases. A `null` or blank method selects the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    #[default]
    SeasonalTrend,
    VectorAutoregression,
    /// Average of seasonal-trend and vector autoregression
    Blend,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::SeasonalTrend => "seasonal_trend",
            Method::VectorAutoregression => "vector_autoregression",
            Method::Blend => "blend",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "seasonal_trend" | "prophet" => Ok(Method::SeasonalTrend),
            "vector_autoregression" | "var" => Ok(Method::VectorAutoregression),
            "blend" => Ok(Method::Blend),
            other => Err(ForecastError::InvalidRequest(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(name) if !name.trim().is_empty() => name.trim().parse().map_err(de::Error::custom),
            _ => Ok(Method::default()),
        }
    }
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

/// A forecast request as received from the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default, rename = "tf", alias = "timeframe")]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub method: Method,
    /// Periods to forecast; absent or zero means the timeframe default
    #[serde(default)]
    pub horizon: Option<usize>,
    #[serde(default)]
    pub candles: Vec<Candle>,
    #[serde(default, deserialize_with = "deserialize_exogenous")]
    pub exog: ExogenousInput,
}

impl ForecastRequest {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        method: Method,
        candles: Vec<Candle>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            method,
            horizon: None,
            candles,
            exog: ExogenousInput::new(),
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn with_exog(mut self, exog: ExogenousInput) -> Self {
        self.exog = exog;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn resolved_horizon(&self) -> usize {
        match self.horizon {
            Some(h) if h > 0 => h,
            _ => self.timeframe.default_horizon(),
        }
    }

    /// Close-price series of the candles
    pub fn series(&self) -> TimeSeries {
        TimeSeries::from_candles(&self.candles)
    }

    /// Boundary checks the engine itself does not perform
    pub fn validate(&self) -> Result<()> {
        if self.candles.len() < MIN_CANDLES {
            return Err(ForecastError::InvalidRequest(format!(
                "not enough candles (>={}) required, got {}",
                MIN_CANDLES,
                self.candles.len()
            )));
        }
        if let Some(c) = self.candles.iter().find(|c| !c.close.is_finite()) {
            return Err(ForecastError::InvalidRequest(format!(
                "candle at {} has a non-finite close",
                c.time
            )));
        }
        Ok(())
    }
}

/// Successful response echoing the request's symbol and timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub symbol: String,
    pub tf: Timeframe,
    pub method: String,
    pub forecast_line: Vec<ForecastPoint>,
    pub confidence: Vec<ConfidenceBand>,
}

impl ForecastResponse {
    pub fn new(request: &ForecastRequest, result: ForecastResult) -> Self {
        Self {
            symbol: request.symbol.clone(),
            tf: request.timeframe,
            method: result.method_used,
            forecast_line: result.forecast_line,
            confidence: result.confidence,
        }
    }
}

/// Failure body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ForecastError> for ErrorResponse {
    fn from(err: &ForecastError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
