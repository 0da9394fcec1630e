//! Simple Moving Average (SMA) indicator.

use super::{Indicator, IndicatorKind};

/// Arithmetic mean of the last `period` closes.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// SMA at every index; `None` for `i < period - 1`.
    ///
    /// Each window is summed afresh rather than rolled, so a constant input
    /// produces that constant exactly.
    pub fn calculate_from_prices(prices: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; prices.len()];
        if period == 0 || prices.len() < period {
            return out;
        }

        for i in (period - 1)..prices.len() {
            let window = &prices[i + 1 - period..=i];
            out[i] = Some(window.iter().sum::<f64>() / period as f64);
        }
        out
    }
}

impl Indicator for Sma {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Sma(self.period)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        Self::calculate_from_prices(closes, self.period)
    }
}
