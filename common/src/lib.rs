pub mod blackout;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod prices;
pub mod types;

pub use blackout::{BlackoutPolicy, BlackoutSet};
pub use config::ControllerConfig;
pub use engine::{DayPlan, Decision, RelayDecisionEngine};
pub use error::ShedError;
pub use forecast::{should_heat_be_on, TemperatureForecast};
pub use prices::{PriceSample, PriceTable};
pub use types::{EngineStatus, LoadKind, PlanEntry, PlanView};
