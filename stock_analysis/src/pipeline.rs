//! One analysis run: validate, fetch, enrich, align, summarize.

use std::sync::Arc;

use market_data_ingestor::providers::DataProvider;
use snafu::{ResultExt, ensure};
use tracing::info;

use crate::{
    alignment::align,
    cache::SeriesCache,
    config::AnalysisRequest,
    errors::{AnalysisError, EmptySeriesSnafu, InvalidConfigSnafu},
    indicators::{EnrichedSeries, enrich},
    summary::{Summary, summarize},
};

/// Everything a presenter needs about a finished run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub request: AnalysisRequest,
    /// Aligned: every row has every indicator.
    pub series: EnrichedSeries,
    pub summary: Summary,
    /// Leading rows removed by alignment.
    pub dropped_rows: usize,
}

/// Runs analyses against a shared [`SeriesCache`].
///
/// Holds no per-run state; several runs may share one pipeline concurrently.
#[derive(Clone)]
pub struct Pipeline {
    cache: Arc<SeriesCache>,
}

impl Pipeline {
    pub fn new(cache: Arc<SeriesCache>) -> Self {
        Self { cache }
    }

    pub fn with_provider(provider: Arc<dyn DataProvider>) -> Self {
        Self::new(Arc::new(SeriesCache::new(provider)))
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Runs one request to completion or to its first error.
    ///
    /// Configuration is checked before the provider is contacted.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        request.validate().context(InvalidConfigSnafu)?;

        let series = self.cache.fetch(&request.bars_params()).await?;
        ensure!(
            !series.is_empty(),
            EmptySeriesSnafu {
                instrument: request.symbol.clone(),
                start: request.start,
                end: request.end,
            }
        );

        let enriched = enrich(&series, &request.indicators);
        let fetched_rows = enriched.len();
        let aligned = align(enriched);
        let dropped_rows = fetched_rows - aligned.len();
        let summary = summarize(&aligned)?;

        info!(
            symbol = %request.symbol,
            rows = aligned.len(),
            dropped_rows,
            total_return = summary.total_return,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            request: request.clone(),
            series: aligned,
            summary,
            dropped_rows,
        })
    }
}
