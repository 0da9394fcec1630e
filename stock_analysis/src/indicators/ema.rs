//! Exponential Moving Average (EMA) indicator.

use super::{Indicator, IndicatorKind, sma::Sma};

/// Exponential Moving Average indicator.
///
/// Multiplier α = 2 / (period + 1). The first value sits where an SMA of the
/// same period first appears and equals that SMA.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn multiplier(period: usize) -> f64 {
        2.0 / (period as f64 + 1.0)
    }

    /// EMA at every index; `None` before `period - 1`.
    ///
    /// Uses `prev + α·(close − prev)`, the same recurrence as
    /// `α·close + (1 − α)·prev`, but exact when `close == prev`.
    pub fn calculate_from_prices(prices: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; prices.len()];
        if period == 0 || prices.len() < period {
            return out;
        }

        let alpha = Self::multiplier(period);
        let Some(seed) = Sma::calculate_from_prices(&prices[..period], period)[period - 1] else {
            return out;
        };
        out[period - 1] = Some(seed);

        let mut prev = seed;
        for (slot, &price) in out.iter_mut().zip(prices).skip(period) {
            prev += alpha * (price - prev);
            *slot = Some(prev);
        }
        out
    }
}

impl Indicator for Ema {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ema(self.period)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        Self::calculate_from_prices(closes, self.period)
    }
}
