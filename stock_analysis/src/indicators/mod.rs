//! Indicator engine: per-row SMA, EMA and RSI over the close sequence.
//!
//! Each indicator is computed independently from the closes and yields one
//! `Option<f64>` per bar; `None` marks a row that lacks a full window. Once an
//! indicator becomes defined it stays defined for every later row, which is
//! what lets [`align`](crate::alignment::align) cut a single leading block.
//!
//! # Supported Indicators
//! - **SMA** - Simple Moving Average
//! - **EMA** - Exponential Moving Average, seeded with the SMA of its window
//! - **RSI** - Relative Strength Index with Wilder smoothing
//!
//! No rounding happens here.

mod ema;
mod rsi;
mod sma;

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use market_data_ingestor::models::{bar::Bar, bar_series::BarSeries};
use thiserror::Error;

use crate::config::IndicatorConfig;

pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;

/// Trait for technical indicators over a close-price sequence.
pub trait Indicator: Send + Sync {
    /// Which indicator this is (also its column name).
    fn kind(&self) -> IndicatorKind;

    /// Computes one value per input price; `None` until the window fills.
    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>>;
}

/// Identity of a configured indicator, displayed as `SMA_20`, `EMA_20`, `RSI_14`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
}

impl IndicatorKind {
    pub fn window(&self) -> usize {
        match *self {
            IndicatorKind::Sma(w) | IndicatorKind::Ema(w) | IndicatorKind::Rsi(w) => w,
        }
    }

    /// Row index of the first defined value.
    ///
    /// SMA and EMA need `w` closes; RSI needs `w` differences, so `w + 1` closes.
    pub fn first_defined_index(&self) -> usize {
        match *self {
            IndicatorKind::Sma(w) | IndicatorKind::Ema(w) => w.saturating_sub(1),
            IndicatorKind::Rsi(w) => w,
        }
    }

    pub fn build(&self) -> Box<dyn Indicator> {
        match *self {
            IndicatorKind::Sma(w) => Box::new(Sma::new(w)),
            IndicatorKind::Ema(w) => Box::new(Ema::new(w)),
            IndicatorKind::Rsi(w) => Box::new(Rsi::new(w)),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(w) => write!(f, "SMA_{w}"),
            IndicatorKind::Ema(w) => write!(f, "EMA_{w}"),
            IndicatorKind::Rsi(w) => write!(f, "RSI_{w}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not an indicator column (expected SMA_<n>, EMA_<n> or RSI_<n>)")]
pub struct IndicatorParseError(pub String);

impl FromStr for IndicatorKind {
    type Err = IndicatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IndicatorParseError(s.to_string());
        let (name, window) = s.trim().split_once('_').ok_or_else(err)?;
        let window: usize = window.parse().map_err(|_| err())?;
        if window == 0 {
            return Err(err());
        }
        match name.to_ascii_uppercase().as_str() {
            "SMA" => Ok(IndicatorKind::Sma(window)),
            "EMA" => Ok(IndicatorKind::Ema(window)),
            "RSI" => Ok(IndicatorKind::Rsi(window)),
            _ => Err(err()),
        }
    }
}

/// Indicator values attached to one bar, in configuration order.
pub type IndicatorSet = IndexMap<IndicatorKind, Option<f64>>;

/// A bar plus its indicator values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBar {
    pub bar: Bar,
    pub indicators: IndicatorSet,
}

impl EnrichedBar {
    pub fn value(&self, kind: IndicatorKind) -> Option<f64> {
        self.indicators.get(&kind).copied().flatten()
    }

    /// Whether every indicator on this row has a value.
    pub fn is_complete(&self) -> bool {
        self.indicators.values().all(Option::is_some)
    }
}

/// Date-ordered bars with indicator values, one [`IndicatorSet`] per row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSeries {
    pub symbol: String,
    pub(crate) kinds: Vec<IndicatorKind>,
    pub(crate) rows: Vec<EnrichedBar>,
}

impl EnrichedSeries {
    pub fn kinds(&self) -> &[IndicatorKind] {
        &self.kinds
    }

    pub fn rows(&self) -> &[EnrichedBar] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.bar.close).collect()
    }

    /// Values of one indicator down the series.
    pub fn column(&self, kind: IndicatorKind) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value(kind)).collect()
    }

    /// Whether no row has an undefined indicator.
    pub fn is_fully_defined(&self) -> bool {
        self.rows.iter().all(EnrichedBar::is_complete)
    }
}

/// Annotates every bar with the configured indicators.
///
/// The result has exactly as many rows as `series`; rows before an
/// indicator's window fills carry `None` for it. A series shorter than a
/// window is valid input and simply leaves that column undefined throughout.
pub fn enrich(series: &BarSeries, config: &IndicatorConfig) -> EnrichedSeries {
    let closes = series.closes();
    let kinds = config.kinds();
    let columns: Vec<Vec<Option<f64>>> = kinds
        .iter()
        .map(|kind| kind.build().compute(&closes))
        .collect();

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| EnrichedBar {
            bar: bar.clone(),
            indicators: kinds
                .iter()
                .zip(&columns)
                .map(|(kind, column)| (*kind, column[i]))
                .collect(),
        })
        .collect();

    EnrichedSeries {
        symbol: series.symbol.clone(),
        kinds,
        rows,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Days, NaiveDate};
    use market_data_ingestor::models::{bar::Bar, bar_series::BarSeries};

    /// Consecutive calendar days starting 2024-01-01, one bar per close.
    pub fn series_from_closes(closes: &[f64]) -> BarSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                date: start + Days::new(i as u64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: 1_000 + i as u64,
            })
            .collect();
        BarSeries::from_bars("TEST", bars)
    }
}
