//! CSV export of an enriched series, and the matching reader.
//!
//! Columns are `date, open, high, low, close, volume` followed by one column
//! per indicator in configuration order. Dates are `YYYY-MM-DD`; numbers use
//! the shortest text that parses back to the same `f64`. An undefined
//! indicator cell is written empty.

use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use snafu::ResultExt;
use thiserror::Error;
use tracing::info;

use crate::{
    errors::{AnalysisError, ExportSnafu, WriteSnafu},
    indicators::{EnrichedSeries, IndicatorKind, IndicatorParseError},
};

const BASE_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Writes `series` as CSV, header included.
pub fn write_csv<W: Write>(series: &EnrichedSeries, writer: W) -> Result<(), AnalysisError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let header = BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(series.kinds().iter().map(ToString::to_string));
    wtr.write_record(header).context(ExportSnafu)?;

    for row in series.rows() {
        let bar = &row.bar;
        let mut record = vec![
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ];
        record.extend(
            series
                .kinds()
                .iter()
                .map(|kind| row.value(*kind).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&record).context(ExportSnafu)?;
    }

    wtr.flush().map_err(csv::Error::from).context(ExportSnafu)
}

/// CSV bytes for `series` (UTF-8).
pub fn to_csv_bytes(series: &EnrichedSeries) -> Result<Vec<u8>, AnalysisError> {
    let mut buf = Vec::new();
    write_csv(series, &mut buf)?;
    Ok(buf)
}

/// Writes export bytes to `target`.
///
/// An existing directory receives `default_name` inside it; any other path is
/// used as the file name. Returns the path written.
pub fn export_to_path(
    bytes: &[u8],
    target: &Path,
    default_name: &str,
) -> Result<PathBuf, AnalysisError> {
    let path = if target.is_dir() {
        target.join(default_name)
    } else {
        target.to_path_buf()
    };
    std::fs::write(&path, bytes).context(WriteSnafu { path: path.clone() })?;
    info!(path = %path.display(), bytes = bytes.len(), "Exported CSV");
    Ok(path)
}

#[derive(Debug, Error)]
pub enum CsvParseError {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error(transparent)]
    UnknownColumn(#[from] IndicatorParseError),

    #[error("row {row}: '{value}' is not a valid {column}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
}

/// One exported row as read back. The date stays textual.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub indicators: IndexMap<IndicatorKind, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCsv {
    pub kinds: Vec<IndicatorKind>,
    pub rows: Vec<ParsedRow>,
}

fn cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    column: &str,
) -> Result<T, CsvParseError> {
    let raw = record.get(idx).unwrap_or_default();
    raw.trim().parse().map_err(|_| CsvParseError::InvalidCell {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Parses CSV produced by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<ParsedCsv, CsvParseError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    for (i, expected) in BASE_COLUMNS.iter().enumerate() {
        if headers.get(i) != Some(*expected) {
            return Err(CsvParseError::MissingColumn(expected));
        }
    }
    let kinds = headers
        .iter()
        .skip(BASE_COLUMNS.len())
        .map(str::parse::<IndicatorKind>)
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let mut indicators = IndexMap::with_capacity(kinds.len());
        for (offset, kind) in kinds.iter().enumerate() {
            let idx = BASE_COLUMNS.len() + offset;
            let value = match record.get(idx).map(str::trim) {
                None | Some("") => None,
                Some(_) => Some(cell(&record, idx, row, &kind.to_string())?),
            };
            indicators.insert(*kind, value);
        }

        rows.push(ParsedRow {
            date: record.get(0).unwrap_or_default().to_string(),
            open: cell(&record, 1, row, "open")?,
            high: cell(&record, 2, row, "high")?,
            low: cell(&record, 3, row, "low")?,
            close: cell(&record, 4, row, "close")?,
            volume: cell(&record, 5, row, "volume")?,
            indicators,
        });
    }

    Ok(ParsedCsv { kinds, rows })
}
