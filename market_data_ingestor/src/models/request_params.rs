use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters for requesting daily bars for one symbol from any provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Ticker as understood by the provider (already uppercased by callers).
    pub symbol: String,

    /// First trading day to include.
    pub start: NaiveDate,

    /// Last trading day to include (inclusive).
    ///
    /// Providers whose APIs take an exclusive end must add one day.
    pub end: NaiveDate,
}

impl BarsRequestParams {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }

    /// Whether `date` falls in `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
