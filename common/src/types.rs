use serde::{Deserialize, Serialize};

use crate::blackout::BlackoutPolicy;

/// Which physical load this controller runs. Picks both the blackout
/// policy and the decision signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    /// Frost-protection heating cable: temperature hysteresis, gated
    /// by isolated blackout hours.
    HeatingCable,
    /// Hot water tank: price blackout only, day/night split policy.
    WaterHeater,
}

impl LoadKind {
    pub fn policy(self) -> BlackoutPolicy {
        match self {
            Self::HeatingCable => BlackoutPolicy::Isolated,
            Self::WaterHeater => BlackoutPolicy::DayNightSplit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HeatingCable => "heating cable",
            Self::WaterHeater => "water heater",
        }
    }
}

/// Snapshot served by the status API.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub load: &'static str,
    #[serde(rename = "relayOn")]
    pub relay_on: Option<bool>,
    #[serde(rename = "currentHour")]
    pub current_hour: u8,
    #[serde(rename = "currentPrice")]
    pub current_price: Option<f64>,
    #[serde(rename = "currentTemp")]
    pub current_temp: Option<f64>,
    #[serde(rename = "blackoutNow")]
    pub blackout_now: bool,
    #[serde(rename = "todayOffHours")]
    pub today_off_hours: Vec<u8>,
    #[serde(rename = "tomorrowOffHours")]
    pub tomorrow_off_hours: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub hour: u8,
    pub price: f64,
}

/// Blackout plans for the lookahead window, served by the plan API.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub today: Vec<PlanEntry>,
    pub tomorrow: Vec<PlanEntry>,
}
