//! Analytics summary over an aligned series.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::{
    errors::{AnalysisError, InsufficientDataSnafu},
    indicators::EnrichedSeries,
};

/// Trading days per year used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum rows needed for a return and a volatility figure.
pub const MIN_ROWS: usize = 2;

/// Headline figures for one analysis run. Ratios, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    /// `end_price / start_price - 1`
    pub total_return: f64,
    /// Sample standard deviation of daily returns times √252.
    pub annualized_volatility: f64,
    /// Number of daily returns the volatility was computed from.
    pub observations: usize,
}

/// Day-over-day percentage changes, `close[i] / close[i-1] - 1`.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample (n - 1) standard deviation; `None` with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}

/// Computes the [`Summary`], refusing series with fewer than [`MIN_ROWS`] rows.
pub fn summarize(series: &EnrichedSeries) -> Result<Summary, AnalysisError> {
    let rows = series.rows();
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return InsufficientDataSnafu {
            rows: 0usize,
            required: MIN_ROWS,
        }
        .fail();
    };
    if rows.len() < MIN_ROWS {
        return InsufficientDataSnafu {
            rows: rows.len(),
            required: MIN_ROWS,
        }
        .fail();
    }

    let returns = daily_returns(&series.closes());
    let daily_vol = sample_std_dev(&returns).unwrap_or_else(|| {
        warn!(
            symbol = %series.symbol,
            "Only one daily return available; reporting zero volatility"
        );
        0.0
    });

    Ok(Summary {
        start_date: first.bar.date,
        end_date: last.bar.date,
        start_price: first.bar.close,
        end_price: last.bar.close,
        total_return: last.bar.close / first.bar.close - 1.0,
        annualized_volatility: daily_vol * TRADING_DAYS_PER_YEAR.sqrt(),
        observations: returns.len(),
    })
}
