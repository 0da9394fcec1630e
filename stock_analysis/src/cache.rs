//! Process-lifetime memoization of fetched series and rendered CSV.
//!
//! - [`SeriesCache`] keys on the exact `(symbol, start, end)` request. At most
//!   one provider call per key is in flight; concurrent callers for the same
//!   key wait on a per-key [`OnceCell`] and share its result.
//! - A failed fetch leaves its cell empty, so the next caller tries again.
//! - Neither cache evicts. Entries live until [`SeriesCache::clear`] or the
//!   end of the process.

use std::{
    collections::HashMap,
    hash::{DefaultHasher, Hash, Hasher},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use market_data_ingestor::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::DataProvider,
};
use snafu::ResultExt;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
    errors::{AnalysisError, FetchSnafu},
    export::to_csv_bytes,
    indicators::EnrichedSeries,
};

type Slot = Arc<OnceCell<Arc<BarSeries>>>;

/// Memoizes provider fetches by request parameters.
pub struct SeriesCache {
    provider: Arc<dyn DataProvider>,
    entries: Mutex<HashMap<BarsRequestParams, Slot>>,
    fetches: AtomicUsize,
}

impl SeriesCache {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            entries: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn slot(&self, params: &BarsRequestParams) -> Slot {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(params.clone()).or_default())
    }

    /// Returns the series for `params`, calling the provider only on a miss.
    pub async fn fetch(&self, params: &BarsRequestParams) -> Result<Arc<BarSeries>, AnalysisError> {
        let slot = self.slot(params);
        if let Some(series) = slot.get() {
            debug!(symbol = %params.symbol, start = %params.start, end = %params.end, "Series cache hit");
            return Ok(Arc::clone(series));
        }

        let series = slot
            .get_or_try_init(|| async {
                info!(
                    provider = self.provider.name(),
                    symbol = %params.symbol,
                    start = %params.start,
                    end = %params.end,
                    "Series cache miss, fetching"
                );
                self.fetches.fetch_add(1, Ordering::SeqCst);
                let series = self.provider.fetch_bars(params).await.context(FetchSnafu {
                    instrument: params.symbol.clone(),
                    start: params.start,
                    end: params.end,
                })?;
                debug!(symbol = %params.symbol, rows = series.len(), "Fetch complete");
                Ok::<_, AnalysisError>(Arc::new(series))
            })
            .await?;
        Ok(Arc::clone(series))
    }

    /// Number of keys seen, including ones whose fetch is pending or failed.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every entry. In-flight fetches still complete for their callers.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// How many times the provider has been called.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// Content fingerprint of an enriched series: symbol, columns, every cell.
fn fingerprint(series: &EnrichedSeries) -> u64 {
    let mut h = DefaultHasher::new();
    series.symbol.hash(&mut h);
    series.kinds().hash(&mut h);
    for row in series.rows() {
        let bar = &row.bar;
        bar.date.hash(&mut h);
        for v in [bar.open, bar.high, bar.low, bar.close] {
            v.to_bits().hash(&mut h);
        }
        bar.volume.hash(&mut h);
        for v in row.indicators.values() {
            v.map(f64::to_bits).hash(&mut h);
        }
    }
    h.finish()
}

/// Memoizes CSV bytes per series content.
#[derive(Default)]
pub struct CsvCache {
    entries: Mutex<HashMap<u64, Arc<[u8]>>>,
    renders: AtomicUsize,
}

impl CsvCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// CSV for `series`, rendered on first request only.
    pub fn get_or_render(&self, series: &EnrichedSeries) -> Result<Arc<[u8]>, AnalysisError> {
        let key = fingerprint(series);
        if let Some(bytes) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!(symbol = %series.symbol, "CSV cache hit");
            return Ok(Arc::clone(bytes));
        }

        let bytes: Arc<[u8]> = to_csv_bytes(series)?.into();
        self.renders.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key).or_insert(bytes)))
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::IndicatorConfig,
        indicators::{enrich, test_support::series_from_closes},
    };

    #[test]
    fn csv_is_rendered_once_per_content() {
        let cache = CsvCache::new();
        let a = enrich(&series_from_closes(&[1.0, 2.0, 3.0]), &IndicatorConfig::default());
        let b = enrich(&series_from_closes(&[1.0, 2.0, 4.0]), &IndicatorConfig::default());

        let first = cache.get_or_render(&a).unwrap();
        let again = cache.get_or_render(&a.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(cache.render_count(), 1);

        let other = cache.get_or_render(&b).unwrap();
        assert_ne!(first, other);
        assert_eq!(cache.render_count(), 2);
    }

    #[test]
    fn fingerprint_sees_indicator_values() {
        let series = enrich(&series_from_closes(&[5.0; 30]), &IndicatorConfig::default());
        let mut changed = series.clone();
        changed.rows[25]
            .indicators
            .insert(crate::indicators::IndicatorKind::Sma(20), Some(5.5));
        assert_ne!(fingerprint(&series), fingerprint(&changed));
    }
}
