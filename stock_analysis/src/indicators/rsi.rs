//! Relative Strength Index (RSI) indicator.

use super::{Indicator, IndicatorKind};

/// Relative Strength Index indicator.
///
/// Measures the speed and change of price movements on a 0-100 scale.
/// RSI > 70 is typically considered overbought, < 30 oversold.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

fn split(change: f64) -> (f64, f64) {
    if change > 0.0 {
        (change, 0.0)
    } else {
        (0.0, -change)
    }
}

/// RSI from smoothed averages. No losses at all (flat prices included) is 100.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// RSI at every index using Wilder's smoothing; `None` before index `period`.
    ///
    /// The first `period` day-over-day changes seed the averages with their
    /// plain mean; after that
    /// `avg = (avg · (period − 1) + current) / period`.
    pub fn calculate_from_prices(prices: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut out = vec![None; prices.len()];
        if period == 0 || prices.len() < period + 1 {
            return out;
        }

        let n = period as f64;
        let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

        let (gain_sum, loss_sum) = changes[..period]
            .iter()
            .map(|&c| split(c))
            .fold((0.0, 0.0), |(g, l), (cg, cl)| (g + cg, l + cl));
        let mut avg_gain = gain_sum / n;
        let mut avg_loss = loss_sum / n;
        out[period] = Some(rsi_value(avg_gain, avg_loss));

        // changes[i - 1] is the move into row i
        for i in (period + 1)..prices.len() {
            let (gain, loss) = split(changes[i - 1]);
            avg_gain = (avg_gain * (n - 1.0) + gain) / n;
            avg_loss = (avg_loss * (n - 1.0) + loss) / n;
            out[i] = Some(rsi_value(avg_gain, avg_loss));
        }
        out
    }
}

impl Indicator for Rsi {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi(self.period)
    }

    fn compute(&self, closes: &[f64]) -> Vec<Option<f64>> {
        Self::calculate_from_prices(closes, self.period)
    }
}
