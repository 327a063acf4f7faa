//! Supported candle timeframes and their fixed parameters

use crate::error::ForecastError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    /// Hourly candles
    #[default]
    #[serde(rename = "1h")]
    Hourly,
    /// Four-hour candles
    #[serde(rename = "4h")]
    FourHourly,
    /// Daily candles
    #[serde(rename = "1d")]
    Daily,
}

impl Timeframe {
    /// Number of periods forecast when the request does not specify a horizon
    pub fn default_horizon(&self) -> usize {
        match self {
            Timeframe::Hourly => 24,
            Timeframe::FourHourly => 18,
            Timeframe::Daily => 7,
        }
    }

    /// Grid spacing in milliseconds
    pub fn step_ms(&self) -> i64 {
        match self {
            Timeframe::Hourly => 60 * 60 * 1000,
            Timeframe::FourHourly => 4 * 60 * 60 * 1000,
            Timeframe::Daily => 24 * 60 * 60 * 1000,
        }
    }

    pub fn step(&self) -> Duration {
        Duration::milliseconds(self.step_ms())
    }

    /// Trailing window of the realized-volatility feature
    pub fn volatility_window(&self) -> usize {
        match self {
            Timeframe::Hourly => 24,
            Timeframe::FourHourly => 6,
            Timeframe::Daily => 7,
        }
    }

    /// Sub-daily timeframes carry an intra-day seasonal cycle
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Timeframe::Daily)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hourly => "1h",
            Timeframe::FourHourly => "4h",
            Timeframe::Daily => "1d",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Timeframe::Hourly),
            "4h" => Ok(Timeframe::FourHourly),
            "1d" => Ok(Timeframe::Daily),
            other => Err(ForecastError::InvalidRequest(format!(
                "unsupported tf: {}",
                other
            ))),
        }
    }
}
