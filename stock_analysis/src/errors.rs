//! Error taxonomy for one analysis run.
//!
//! Every variant propagates to the caller unchanged; nothing in the pipeline
//! retries or substitutes a fallback result.

use std::path::PathBuf;

use chrono::NaiveDate;
use market_data_ingestor::providers::ProviderError;
use snafu::Snafu;

use crate::config::ConfigError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AnalysisError {
    /// The provider was unreachable or did not know the instrument.
    #[snafu(display("Could not fetch data for '{instrument}' ({start} to {end}): {source}"))]
    Fetch {
        instrument: String,
        start: NaiveDate,
        end: NaiveDate,
        source: ProviderError,
    },

    /// The fetch succeeded but returned no bars.
    #[snafu(display("No trading data for '{instrument}' between {start} and {end}"))]
    EmptySeries {
        instrument: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Too few rows survive indicator warm-up to summarize.
    #[snafu(display(
        "Insufficient data: {rows} fully-defined rows, at least {required} needed"
    ))]
    InsufficientData { rows: usize, required: usize },

    /// A parameter is out of bounds; raised before any fetch.
    #[snafu(display("Invalid configuration: {source}"))]
    InvalidConfig { source: ConfigError },

    #[snafu(display("CSV export failed: {source}"))]
    Export { source: csv::Error },

    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Failed to encode chart spec: {source}"))]
    Chart { source: serde_json::Error },

    #[snafu(display("Failed to write report: {source}"))]
    Present { source: std::io::Error },
}

impl AnalysisError {
    /// Short, stable label for logs and exit messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Fetch { .. } => "fetch",
            AnalysisError::EmptySeries { .. } => "empty_series",
            AnalysisError::InsufficientData { .. } => "insufficient_data",
            AnalysisError::InvalidConfig { .. } => "invalid_config",
            AnalysisError::Export { .. } | AnalysisError::Write { .. } => "export",
            AnalysisError::Chart { .. } => "chart",
            AnalysisError::Present { .. } => "present",
        }
    }

    /// Message for the person who asked for the analysis.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Fetch { instrument, source, .. } => format!(
                "Could not fetch data for '{instrument}'. Please check the ticker symbol and the selected date range. ({source})"
            ),
            AnalysisError::EmptySeries { instrument, .. } => format!(
                "Could not fetch data for '{instrument}'. Please check the ticker symbol and the selected date range. (no trading days returned)"
            ),
            AnalysisError::InsufficientData { rows, required } => format!(
                "Not enough data to analyze: only {rows} rows have every indicator defined, {required} needed. Widen the date range or shorten the indicator windows."
            ),
            other => other.to_string(),
        }
    }
}
