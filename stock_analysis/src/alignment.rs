//! Window alignment: cut the warm-up rows so every remaining row is complete.

use tracing::debug;

use crate::indicators::EnrichedSeries;

/// Index of the earliest row where all configured indicators are defined.
///
/// Indicators never become undefined again once defined, so this row starts
/// a fully-defined suffix.
pub fn first_complete_index(series: &EnrichedSeries) -> Option<usize> {
    series.rows.iter().position(|row| row.is_complete())
}

/// Drops every row before [`first_complete_index`].
///
/// Returns an empty series (same symbol and columns) when no row is complete;
/// that is a valid result here and is rejected later by the summarizer.
pub fn align(mut series: EnrichedSeries) -> EnrichedSeries {
    let cut = first_complete_index(&series).unwrap_or(series.rows.len());
    if cut > 0 {
        debug!(
            symbol = %series.symbol,
            dropped = cut,
            kept = series.rows.len() - cut,
            "Dropped warm-up rows"
        );
    }
    series.rows.drain(..cut);
    series
}
