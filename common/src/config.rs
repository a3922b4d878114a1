use serde::{Deserialize, Serialize};

use crate::types::LoadKind;

/// Startup configuration. Every field has a default, so a partial
/// JSON file only needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub load: LoadKind,
    /// Number of hours to shed per day.
    pub shed_hours: usize,
    /// Bidding region code in the price feed (SE1-SE4).
    pub price_region: String,
    /// Hours cheaper than this are never worth shedding (SEK/kWh).
    pub price_floor: f64,
    pub decision_interval_ms: u64,
    /// Base URL of the relay device (Shelly Gen2 RPC).
    pub relay_host: String,
    pub relay_id: u8,
    /// Hour of day after which tomorrow's prices are pre-fetched.
    pub next_day_fetch_hour: u8,
    /// Empty string disables the notifier.
    pub webhook_url: String,
    pub latitude: String,
    pub longitude: String,
    pub temp_refresh_interval_ms: u64,
    /// Heat is never on above this temperature (°C).
    pub temp_high_threshold: f64,
    /// Margin below zero before price shedding may apply (°C).
    pub temp_hysteresis: f64,
    pub timezone: String,
    pub http_port: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            load: LoadKind::WaterHeater,
            shed_hours: 8,
            price_region: "SE1".to_string(),
            price_floor: 0.09,
            decision_interval_ms: 60_000,
            relay_host: "http://192.168.1.200".to_string(),
            relay_id: 0,
            next_day_fetch_hour: 17,
            webhook_url: String::new(),
            latitude: "64.6857".to_string(),
            longitude: "20.6049".to_string(),
            temp_refresh_interval_ms: 1_800_000,
            temp_high_threshold: 1.0,
            temp_hysteresis: 0.5,
            timezone: "Europe/Stockholm".to_string(),
            http_port: 8080,
        }
    }
}

impl ControllerConfig {
    pub fn sanitize(&mut self) {
        if self.shed_hours > 24 {
            self.shed_hours = 24;
        }
        if self.next_day_fetch_hour > 23 {
            self.next_day_fetch_hour = 23;
        }
        if self.decision_interval_ms < 1_000 {
            self.decision_interval_ms = 1_000;
        }
        if self.temp_refresh_interval_ms < 60_000 {
            self.temp_refresh_interval_ms = 60_000;
        }
        if !self.price_floor.is_finite() || self.price_floor < 0.0 {
            self.price_floor = 0.0;
        }
        if !self.temp_hysteresis.is_finite() || self.temp_hysteresis < 0.0 {
            self.temp_hysteresis = 0.0;
        }
        if !self.temp_high_threshold.is_finite() {
            self.temp_high_threshold = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"load":"heating_cable","shed_hours":4}"#).unwrap();

        assert_eq!(config.load, LoadKind::HeatingCable);
        assert_eq!(config.shed_hours, 4);
        assert_eq!(config.price_region, "SE1");
        assert_eq!(config.next_day_fetch_hour, 17);
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let mut config = ControllerConfig {
            shed_hours: 48,
            next_day_fetch_hour: 99,
            decision_interval_ms: 10,
            temp_refresh_interval_ms: 5,
            price_floor: -1.0,
            temp_hysteresis: f64::NAN,
            ..ControllerConfig::default()
        };
        config.sanitize();

        assert_eq!(config.shed_hours, 24);
        assert_eq!(config.next_day_fetch_hour, 23);
        assert_eq!(config.decision_interval_ms, 1_000);
        assert_eq!(config.temp_refresh_interval_ms, 60_000);
        assert_eq!(config.price_floor, 0.0);
        assert_eq!(config.temp_hysteresis, 0.0);
    }
}
