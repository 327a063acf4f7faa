//! Persistence forecast: the last price held flat

use crate::config::StubConfig;
use crate::data::{ConfidenceBand, ForecastPoint, ForecastResult};
use crate::error::Result;
use crate::models::{ForecastInput, ForecastStrategy};

/// Flat continuation of the last close with a fixed-width band.
///
/// Always available; it is the fallback whenever another strategy cannot run.
#[derive(Debug, Clone)]
pub struct PersistenceStrategy {
    band_fraction: f64,
}

impl PersistenceStrategy {
    pub const NAME: &'static str = "Stub";

    pub fn new(config: &StubConfig) -> Self {
        Self {
            band_fraction: config.band_fraction,
        }
    }
}

impl Default for PersistenceStrategy {
    fn default() -> Self {
        Self::new(&StubConfig::default())
    }
}

impl ForecastStrategy for PersistenceStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn forecast(&self, input: &ForecastInput<'_>) -> Result<ForecastResult> {
        let (_, last_price) = input.last_observation()?;
        let times = input.future_times()?;

        let forecast_line = times
            .iter()
            .map(|&time| ForecastPoint {
                time,
                value: last_price,
            })
            .collect();
        let confidence = times
            .iter()
            .map(|&time| ConfidenceBand {
                time,
                low: last_price * (1.0 - self.band_fraction),
                high: last_price * (1.0 + self.band_fraction),
            })
            .collect();

        Ok(ForecastResult::new(Self::NAME, forecast_line, confidence))
    }
}
