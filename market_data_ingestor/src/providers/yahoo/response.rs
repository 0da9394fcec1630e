//! Chart API payload and its flattening into per-date rows.
//!
//! Yahoo returns one array per field (`open`, `high`, ...) aligned with a
//! `timestamp` array, any element of which may be `null`. [`ChartData::into_rows`]
//! zips them into [`RawBar`]s so the rest of the crate only ever sees the
//! flat one-row-per-date shape.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::models::bar::RawBar;

#[derive(Debug, Deserialize)]
pub struct YahooResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    pub meta: ChartMeta,
    /// Absent when nothing traded in the window.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    /// Seconds east of UTC for the listing exchange.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartError {
    pub fn is_not_found(&self) -> bool {
        self.code.eq_ignore_ascii_case("not found")
    }
}

fn column<T: Copy>(values: &[Option<T>], i: usize) -> Option<T> {
    values.get(i).copied().flatten()
}

impl ChartData {
    /// Trading date for a bar timestamp, in the exchange's local calendar.
    pub fn trading_date(&self, ts: i64) -> Option<NaiveDate> {
        DateTime::from_timestamp(ts + self.meta.gmtoffset, 0).map(|dt| dt.date_naive())
    }

    /// Zips the parallel columns into one [`RawBar`] per timestamp.
    ///
    /// Short columns read as missing values rather than shifting rows.
    pub fn into_rows(self) -> Vec<RawBar> {
        let quote = self.indicators.quote.first();
        let empty = Quote::default();
        let quote = quote.unwrap_or(&empty);

        self.timestamp
            .iter()
            .enumerate()
            .map(|(i, &ts)| RawBar {
                date: self.trading_date(ts),
                open: column(&quote.open, i),
                high: column(&quote.high, i),
                low: column(&quote.low, i),
                close: column(&quote.close, i),
                volume: column(&quote.volume, i)
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map(|v| v.round() as u64),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AAPL: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "symbol": "AAPL", "gmtoffset": -18000, "exchangeTimezoneName": "America/New_York"},
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null],
                        "high":   [188.44, 185.88, 183.09],
                        "low":    [183.89, 183.43, 180.88],
                        "close":  [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }],
                    "adjclose": [{"adjclose": [184.29, 182.91, 180.59]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn flattens_parallel_columns() {
        let resp: YahooResponse = serde_json::from_str(AAPL).unwrap();
        let data = resp.chart.result.unwrap().into_iter().next().unwrap();
        assert_eq!(data.meta.symbol, "AAPL");

        let rows = data.into_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(rows[0].close, Some(185.64));
        assert_eq!(rows[0].volume, Some(82_488_700));
        // the null open survives as a missing field
        assert_eq!(rows[2].open, None);
    }

    #[test]
    fn missing_timestamps_mean_no_rows() {
        let body = r#"{"chart": {"result": [{"meta": {"symbol": "AAPL", "gmtoffset": 0}, "indicators": {"quote": [{}]}}], "error": null}}"#;
        let resp: YahooResponse = serde_json::from_str(body).unwrap();
        let data = resp.chart.result.unwrap().into_iter().next().unwrap();
        assert!(data.into_rows().is_empty());
    }

    #[test]
    fn not_found_error_is_recognised() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let resp: YahooResponse = serde_json::from_str(body).unwrap();
        let err = resp.chart.error.unwrap();
        assert!(err.is_not_found());
        assert!(err.description.contains("delisted"));
    }
}
