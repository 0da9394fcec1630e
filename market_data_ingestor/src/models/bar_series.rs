//! A validated, date-ordered run of daily bars for one symbol.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::bar::{Bar, BarRejection, RawBar};

/// Represents a complete set of daily bars for a single symbol.
///
/// Bars are strictly increasing by date with no duplicates. Build one through
/// [`BarSeries::from_raw`] (or [`BarSeries::from_bars`]) so the ordering
/// invariant holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The collection of OHLCV bars, oldest first.
    bars: Vec<Bar>,
}

/// Counts of rows dropped while normalizing provider output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationReport {
    pub missing_field: usize,
    pub invalid_price: usize,
    pub inverted_range: usize,
    pub duplicate_date: usize,
}

impl NormalizationReport {
    /// Total number of rows that did not make it into the series.
    pub fn dropped(&self) -> usize {
        self.missing_field + self.invalid_price + self.inverted_range + self.duplicate_date
    }
}

impl BarSeries {
    /// An empty series, e.g. a valid symbol with no trading in range.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Validates provider rows and orders them.
    ///
    /// - rows failing [`RawBar::validate`] are dropped
    /// - the rest are sorted ascending by date
    /// - for duplicate dates the first row in provider order wins
    pub fn from_raw(
        symbol: impl Into<String>,
        rows: impl IntoIterator<Item = RawBar>,
    ) -> (Self, NormalizationReport) {
        let mut report = NormalizationReport::default();
        let mut bars = Vec::new();

        for raw in rows {
            match raw.validate() {
                Ok(bar) => bars.push(bar),
                Err(BarRejection::MissingField) => report.missing_field += 1,
                Err(BarRejection::InvalidPrice) => report.invalid_price += 1,
                Err(BarRejection::InvertedRange) => report.inverted_range += 1,
            }
        }

        // stable sort keeps provider order among equal dates
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        let mut seen = HashSet::with_capacity(before);
        bars.retain(|b| seen.insert(b.date));
        report.duplicate_date = before - bars.len();

        (
            Self {
                symbol: symbol.into(),
                bars,
            },
            report,
        )
    }

    /// Builds a series from already-valid bars, applying the same ordering rules.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self::from_raw(symbol, bars.into_iter().map(RawBar::from)).0
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// First and last trading date, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.bars.first()?.date, self.bars.last()?.date))
    }
}
