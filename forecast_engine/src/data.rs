//! Value types flowing through the engine
//!
//! All of these are created fresh per request and dropped once the response
//! is produced.

use crate::error::{ForecastError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One price observation. Only `time` and `close` are used by the strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Epoch milliseconds
    pub time: i64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: i64, close: f64) -> Self {
        Self {
            time,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// A raw exogenous observation as supplied by the caller.
///
/// Either field may be missing or unreadable; such points are discarded
/// during alignment. Numeric strings are accepted for both fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPoint {
    #[serde(default, deserialize_with = "lenient_time")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: Option<f64>,
}

fn lenient_time<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_value<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

impl RawPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self {
            time: Some(time),
            value: Some(value),
        }
    }
}

/// Feature name to raw, possibly irregular series. Keeps the caller's order.
pub type ExogenousInput = IndexMap<String, Vec<RawPoint>>;

/// Deserialize an [`ExogenousInput`] without rejecting the request over bad data.
///
/// A `null` map is empty. A series that is not an array becomes empty and a
/// point that is not an object is dropped, so alignment later skips the
/// feature instead of the whole request failing.
pub fn deserialize_exogenous<'de, D>(
    deserializer: D,
) -> std::result::Result<ExogenousInput, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, series)| (name, lenient_series(series)))
        .collect())
}

fn lenient_series(series: Value) -> Vec<RawPoint> {
    match series {
        Value::Array(points) => points
            .into_iter()
            .filter_map(|point| serde_json::from_value(point).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Ordered `(time, value)` pairs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "SeriesParts")]
pub struct TimeSeries {
    times: Vec<i64>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct SeriesParts {
    times: Vec<i64>,
    values: Vec<f64>,
}

impl TryFrom<SeriesParts> for TimeSeries {
    type Error = ForecastError;

    fn try_from(parts: SeriesParts) -> Result<Self> {
        Self::new(parts.times, parts.values)
    }
}

impl TimeSeries {
    /// Create a series from parallel vectors of equal length
    pub fn new(times: Vec<i64>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(ForecastError::InvalidRequest(format!(
                "Times length ({}) doesn't match values length ({})",
                times.len(),
                values.len()
            )));
        }
        Ok(Self { times, values })
    }

    /// Close-price level series of a candle sequence
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self {
            times: candles.iter().map(|c| c.time).collect(),
            values: candles.iter().map(|c| c.close).collect(),
        }
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Last `(time, value)` pair, if any
    pub fn last(&self) -> Option<(i64, f64)> {
        Some((*self.times.last()?, *self.values.last()?))
    }
}

/// Feature name to a series sampled exactly on the candle grid
pub type AlignedExogenous = IndexMap<String, TimeSeries>;

/// A predicted price level at a future timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub time: i64,
    pub value: f64,
}

/// Prediction interval for one forecast point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub time: i64,
    pub low: f64,
    pub high: f64,
}

/// Outcome of a forecast, tagged with the method that actually produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub method_used: String,
    pub forecast_line: Vec<ForecastPoint>,
    /// One band per point; empty for blended output
    pub confidence: Vec<ConfidenceBand>,
}

impl ForecastResult {
    pub fn new(
        method_used: impl Into<String>,
        forecast_line: Vec<ForecastPoint>,
        confidence: Vec<ConfidenceBand>,
    ) -> Self {
        Self {
            method_used: method_used.into(),
            forecast_line,
            confidence,
        }
    }

    /// Forecast values in time order
    pub fn values(&self) -> Vec<f64> {
        self.forecast_line.iter().map(|p| p.value).collect()
    }

    /// Forecast timestamps in time order
    pub fn times(&self) -> Vec<i64> {
        self.forecast_line.iter().map(|p| p.time).collect()
    }

    pub fn horizons(&self) -> usize {
        self.forecast_line.len()
    }
}
