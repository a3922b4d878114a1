use serde::Deserialize;

use crate::error::ShedError;

/// One hourly sample as delivered by the day-ahead price feed.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceSample {
    pub time_start: String,
    #[serde(rename = "SEK_per_kWh")]
    pub price: f64,
}

/// Hour-of-day taken from characters 11-12 of an ISO-8601 timestamp
/// (local time, 24-hour clock).
pub(crate) fn hour_from_timestamp(timestamp: &str) -> Result<u8, ShedError> {
    let digits = timestamp.get(11..13).ok_or_else(|| {
        ShedError::DataFormat(format!("timestamp too short: {timestamp:?}"))
    })?;
    let hour: u8 = digits.parse().map_err(|_| {
        ShedError::DataFormat(format!("bad hour in timestamp: {timestamp:?}"))
    })?;
    if hour > 23 {
        return Err(ShedError::DataFormat(format!("hour out of range: {hour}")));
    }
    Ok(hour)
}

/// Spot prices for one calendar day, keyed by hour of day. Hours with
/// no sample are unknown: never selected for blackout, never reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    prices: [Option<f64>; 24],
}

impl PriceTable {
    /// Builds a table from the feed's samples. Any malformed timestamp
    /// fails the whole build, so a corrupt day is never partially
    /// applied. Duplicate hours keep the last sample.
    pub fn from_samples(samples: &[PriceSample]) -> Result<Self, ShedError> {
        let mut prices = [None; 24];
        for sample in samples {
            let hour = hour_from_timestamp(&sample.time_start)?;
            prices[hour as usize] = Some(sample.price);
        }
        Ok(Self { prices })
    }

    pub fn price(&self, hour: u8) -> Option<f64> {
        self.prices.get(hour as usize).copied().flatten()
    }

    /// Known hours in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.prices
            .iter()
            .enumerate()
            .filter_map(|(hour, price)| price.map(|p| (hour as u8, p)))
    }

    pub fn is_empty(&self) -> bool {
        self.prices.iter().all(Option::is_none)
    }
}
