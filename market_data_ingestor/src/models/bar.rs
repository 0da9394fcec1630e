//! Canonical in-memory representation of a daily OHLCV bar.
//!
//! [`Bar`] is the standard output of every
//! [`DataProvider`](crate::providers::DataProvider) implementation.
//! [`RawBar`] is the provider-shaped row before validation: one row per date,
//! one optional column per field, which is the flat shape every provider must
//! reduce its payload to before handing it over.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single trading day (OHLCV) for one instrument.
///
/// Invariants (enforced by [`RawBar::validate`]): all prices are finite and
/// positive, and `high >= low`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date (exchange-local calendar day).
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price of the day.
    pub high: f64,

    /// Lowest price of the day.
    pub low: f64,

    /// Closing price. This is the canonical price for all derived analytics.
    pub close: f64,

    /// Shares traded during the day.
    pub volume: u64,
}

/// A provider row whose fields may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Why a [`RawBar`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarRejection {
    /// A required field was absent.
    MissingField,
    /// A price was zero, negative, NaN or infinite.
    InvalidPrice,
    /// `high < low`.
    InvertedRange,
}

impl RawBar {
    /// Converts the row into a [`Bar`], or reports why it can't be one.
    pub fn validate(&self) -> Result<Bar, BarRejection> {
        let (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            self.date, self.open, self.high, self.low, self.close, self.volume,
        ) else {
            return Err(BarRejection::MissingField);
        };

        if [open, high, low, close]
            .iter()
            .any(|p| !p.is_finite() || *p <= 0.0)
        {
            return Err(BarRejection::InvalidPrice);
        }
        if high < low {
            return Err(BarRejection::InvertedRange);
        }

        Ok(Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

impl From<Bar> for RawBar {
    fn from(bar: Bar) -> Self {
        Self {
            date: Some(bar.date),
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
        }
    }
}
