use crate::error::ShedError;
use crate::prices::hour_from_timestamp;

/// Short-term temperature forecast, keyed by hour of day. Replaced
/// wholesale on every successful weather fetch; entries from a prior
/// fetch are discarded, never merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureForecast {
    temps: [Option<f64>; 24],
}

impl TemperatureForecast {
    /// Builds a forecast from the weather feed's parallel hour/value
    /// arrays. Any malformed timestamp or a length mismatch fails the
    /// whole build.
    pub fn from_hourly(times: &[String], temperatures: &[f64]) -> Result<Self, ShedError> {
        if times.len() != temperatures.len() {
            return Err(ShedError::DataFormat(format!(
                "hourly arrays differ in length: {} timestamps, {} temperatures",
                times.len(),
                temperatures.len()
            )));
        }
        let mut temps = [None; 24];
        for (timestamp, temperature) in times.iter().zip(temperatures) {
            let hour = hour_from_timestamp(timestamp)?;
            temps[hour as usize] = Some(*temperature);
        }
        Ok(Self { temps })
    }

    pub fn temperature(&self, hour: u8) -> Option<f64> {
        self.temps.get(hour as usize).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.temps.iter().all(Option::is_none)
    }
}

/// Hysteresis decision for a frost-protection load. The ordering is
/// deliberate: the comfort band (step 2) is checked before the price
/// blackout (step 3), so shedding only ever applies once the
/// temperature has dropped below `-hysteresis_margin`.
pub fn should_heat_be_on(
    temperature: f64,
    hour_is_blackout: bool,
    high_threshold: f64,
    hysteresis_margin: f64,
) -> bool {
    if temperature > high_threshold {
        return false;
    }
    if temperature > -hysteresis_margin {
        return true;
    }
    !hour_is_blackout
}
