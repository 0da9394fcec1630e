use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::America::New_York;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::bar::RawBar;

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: Option<f64>,
    #[serde(rename = "h")]
    pub high: Option<f64>,
    #[serde(rename = "l")]
    pub low: Option<f64>,
    #[serde(rename = "c")]
    pub close: Option<f64>,
    #[serde(rename = "v")]
    pub volume: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    /// Per-symbol bars; `null` when nothing traded in the window.
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

impl AlpacaBar {
    /// Daily bars are stamped at midnight New York time; the trading date is
    /// that local calendar day.
    pub fn trading_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&New_York).date_naive()
    }

    pub fn into_raw(self) -> RawBar {
        RawBar {
            date: Some(self.trading_date()),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self
                .volume
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64),
        }
    }
}
