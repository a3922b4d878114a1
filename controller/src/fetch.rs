use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;

use loadshed_common::{PriceSample, PriceTable, ShedError, TemperatureForecast};

pub const DEFAULT_PRICE_BASE_URL: &str = "https://www.elprisetjustnu.se";
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.open-meteo.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const FORECAST_HOURS: u8 = 12;

/// Day-ahead spot price client (elprisetjustnu.se).
#[derive(Debug, Clone)]
pub struct PriceClient {
    client: Client,
    base_url: String,
}

impl PriceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches one calendar day for a bidding region and builds the
    /// price table. Transport and format failures are soft: the caller
    /// logs them and keeps the previous table.
    pub async fn fetch_day(&self, date: NaiveDate, region: &str) -> Result<PriceTable, ShedError> {
        let url = format!(
            "{}/api/v1/prices/{}/{:02}-{:02}_{}.json",
            self.base_url,
            date.year(),
            date.month(),
            date.day(),
            region
        );
        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|err| ShedError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ShedError::Transport(format!(
                "price feed returned HTTP {}",
                response.status()
            )));
        }
        let samples: Vec<PriceSample> = response
            .json()
            .await
            .map_err(|err| ShedError::DataFormat(err.to_string()))?;
        PriceTable::from_samples(&samples)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastBody {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
}

/// Short-term temperature forecast client (open-meteo).
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_forecast(
        &self,
        latitude: &str,
        longitude: &str,
    ) -> Result<TemperatureForecast, ShedError> {
        let url = format!(
            "{}/v1/forecast?latitude={latitude}&longitude={longitude}\
             &hourly=temperature_2m&forecast_hours={FORECAST_HOURS}",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|err| ShedError::Transport(err.to_string()))?;
        if !response.status().is_success() {
            return Err(ShedError::Transport(format!(
                "weather feed returned HTTP {}",
                response.status()
            )));
        }
        let body: ForecastBody = response
            .json()
            .await
            .map_err(|err| ShedError::DataFormat(err.to_string()))?;
        TemperatureForecast::from_hourly(&body.hourly.time, &body.hourly.temperature_2m)
    }
}
