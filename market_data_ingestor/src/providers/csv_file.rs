//! Daily bars from a local CSV file.
//!
//! Accepts the layout spreadsheet tools and most vendor downloads produce:
//! a header row naming `Date`, `Open`, `High`, `Low`, `Close` and `Volume`
//! (any case, any order, extra columns such as `Adj Close` ignored). Dates may
//! carry a time suffix (`2024-01-02 00:00:00-05:00`); only the calendar day is
//! kept. Unparsable cells become missing fields and the row is dropped during
//! normalization.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{bar::RawBar, bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        CsvSnafu, DataProvider, IoSnafu, ProviderError, UnknownSymbolSnafu, ValidationSnafu,
    },
};

pub struct CsvFileProvider {
    path_template: String,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvFileProvider {
    /// `path_template` may contain `{symbol}`, replaced by the requested ticker.
    pub fn new(path_template: impl Into<String>) -> Self {
        Self {
            path_template: path_template.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        PathBuf::from(self.path_template.replace("{symbol}", symbol))
    }
}

fn locate_columns(headers: &csv::StringRecord, path: &Path) -> Result<Columns, ProviderError> {
    let find = |name: &str| -> Result<usize, ProviderError> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                ValidationSnafu {
                    message: format!("{} has no '{name}' column", path.display()),
                }
                .build()
            })
    };
    Ok(Columns {
        date: find("date")?,
        open: find("open")?,
        high: find("high")?,
        low: find("low")?,
        close: find("close")?,
        volume: find("volume")?,
    })
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let day = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn parse_price(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

fn parse_volume(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    cell.parse::<u64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

/// Parses CSV bytes into provider rows.
pub fn parse_rows(bytes: &[u8], path: &Path) -> Result<Vec<RawBar>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers().context(CsvSnafu { path })?.clone();
    let cols = locate_columns(&headers, path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context(CsvSnafu { path })?;
        let cell = |i: usize| record.get(i).unwrap_or("");
        rows.push(RawBar {
            date: parse_date(cell(cols.date)),
            open: parse_price(cell(cols.open)),
            high: parse_price(cell(cols.high)),
            low: parse_price(cell(cols.low)),
            close: parse_price(cell(cols.close)),
            volume: parse_volume(cell(cols.volume)),
        });
    }
    Ok(rows)
}

#[async_trait]
impl DataProvider for CsvFileProvider {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let path = self.path_for(&params.symbol);
        debug!(path = %path.display(), "reading bars from csv");

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return UnknownSymbolSnafu {
                    symbol: params.symbol.clone(),
                }
                .fail();
            }
            Err(e) => return Err(e).context(IoSnafu { path }),
        };

        let mut rows = parse_rows(&bytes, &path)?;
        rows.retain(|r| r.date.is_none_or(|d| params.contains(d)));
        let (series, report) = BarSeries::from_raw(params.symbol.clone(), rows);
        if report.dropped() > 0 {
            warn!(path = %path.display(), ?report, "dropped invalid csv rows");
        }
        Ok(series)
    }
}
