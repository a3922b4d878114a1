use crate::blackout::{BlackoutPolicy, BlackoutSet};
use crate::forecast::{should_heat_be_on, TemperatureForecast};
use crate::prices::PriceTable;
use crate::types::{EngineStatus, LoadKind, PlanEntry, PlanView};

/// One day's prices together with the blackout hours chosen from them.
/// Built in one step and always replaced as a unit, so a decision tick
/// never sees a table without its matching blackout set.
#[derive(Debug, Clone, Default)]
pub struct DayPlan {
    pub table: PriceTable,
    pub blackout: BlackoutSet,
}

impl DayPlan {
    pub fn build(
        table: PriceTable,
        price_floor: f64,
        target_count: usize,
        policy: BlackoutPolicy,
    ) -> Self {
        let blackout = BlackoutSet::select(&table, price_floor, target_count, policy);
        Self { table, blackout }
    }
}

/// Outcome of one decision tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Relay target for this tick. The command is re-asserted every
    /// tick even when unchanged; `transition` carries the operator
    /// notification only when the target differs from the last
    /// emitted state.
    Switch {
        on: bool,
        transition: Option<String>,
    },
    /// The thermal signal is missing for this hour. The caller should
    /// trigger a forecast refresh and try again next tick; the relay
    /// is left untouched.
    Deferred,
}

/// Long-lived decision state machine. Owns the current plans, the
/// forecast, and the last emitted relay state; all mutation goes
/// through its update and decide entry points.
#[derive(Debug)]
pub struct RelayDecisionEngine {
    load: LoadKind,
    high_threshold: f64,
    hysteresis_margin: f64,
    today: Option<DayPlan>,
    tomorrow: Option<DayPlan>,
    forecast: TemperatureForecast,
    last_emitted: Option<bool>,
}

impl RelayDecisionEngine {
    pub fn new(load: LoadKind, high_threshold: f64, hysteresis_margin: f64) -> Self {
        Self {
            load,
            high_threshold,
            hysteresis_margin,
            today: None,
            tomorrow: None,
            forecast: TemperatureForecast::default(),
            last_emitted: None,
        }
    }

    pub fn set_today(&mut self, plan: DayPlan) {
        self.today = Some(plan);
    }

    pub fn set_tomorrow(&mut self, plan: DayPlan) {
        self.tomorrow = Some(plan);
    }

    pub fn set_forecast(&mut self, forecast: TemperatureForecast) {
        self.forecast = forecast;
    }

    pub fn last_emitted(&self) -> Option<bool> {
        self.last_emitted
    }

    /// Resolves the relay target for the current wall-clock hour.
    pub fn decide(&mut self, hour: u8, minute: u8) -> Decision {
        let (on, detail) = match self.load {
            LoadKind::HeatingCable => {
                let Some(temperature) = self.forecast.temperature(hour) else {
                    return Decision::Deferred;
                };
                let blackout = self.blackout_today(hour);
                let on = should_heat_be_on(
                    temperature,
                    blackout,
                    self.high_threshold,
                    self.hysteresis_margin,
                );
                (on, format!(" ({temperature:.1} C)"))
            }
            LoadKind::WaterHeater => {
                let mut off = self.blackout_today(hour);
                // Before 04:00 the new day's prices may not be in yet;
                // tomorrow's plan covers those hours. Unknown after
                // that still fails open to ON.
                if !off && hour < 4 {
                    if let Some(tomorrow) = &self.tomorrow {
                        off = tomorrow.blackout.contains(hour);
                    }
                }
                (!off, String::new())
            }
        };

        let transition = match self.last_emitted {
            Some(previous) if previous != on => {
                Some(self.transition_message(hour, minute, on, &detail))
            }
            // The first decision sets the baseline silently.
            _ => None,
        };
        self.last_emitted = Some(on);
        Decision::Switch { on, transition }
    }

    pub fn status(&self, hour: u8) -> EngineStatus {
        EngineStatus {
            load: self.load.label(),
            relay_on: self.last_emitted,
            current_hour: hour,
            current_price: self.today.as_ref().and_then(|plan| plan.table.price(hour)),
            current_temp: self.forecast.temperature(hour),
            blackout_now: self.blackout_today(hour),
            today_off_hours: Self::off_hours(self.today.as_ref()),
            tomorrow_off_hours: Self::off_hours(self.tomorrow.as_ref()),
        }
    }

    pub fn plan_view(&self) -> PlanView {
        PlanView {
            today: Self::entries(self.today.as_ref()),
            tomorrow: Self::entries(self.tomorrow.as_ref()),
        }
    }

    fn blackout_today(&self, hour: u8) -> bool {
        self.today
            .as_ref()
            .map(|plan| plan.blackout.contains(hour))
            .unwrap_or(false)
    }

    fn transition_message(&self, hour: u8, minute: u8, on: bool, detail: &str) -> String {
        let state = if on { "ON" } else { "OFF" };
        match self.load {
            LoadKind::HeatingCable => {
                format!("{hour:02}:{minute:02} - heating cable {state}{detail}")
            }
            LoadKind::WaterHeater => format!("{hour:02}:00 - water heater {state}"),
        }
    }

    fn off_hours(plan: Option<&DayPlan>) -> Vec<u8> {
        plan.map(|plan| plan.blackout.hours().collect())
            .unwrap_or_default()
    }

    fn entries(plan: Option<&DayPlan>) -> Vec<PlanEntry> {
        plan.map(|plan| {
            plan.blackout
                .iter()
                .map(|(hour, price)| PlanEntry { hour, price })
                .collect()
        })
        .unwrap_or_default()
    }
}
