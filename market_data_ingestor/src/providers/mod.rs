//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam between the
//! analysis pipeline and whichever vendor supplies daily bars (Yahoo, Alpaca,
//! or a local CSV file).
//!
//! Every implementation must hand back a flat, validated
//! [`BarSeries`]: one row per date, one field per column. Vendor payload
//! quirks (parallel nullable arrays, nested per-symbol maps, paging) are
//! resolved inside the provider, never downstream.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{bar_series::BarSeries, request_params::BarsRequestParams};
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "mine"
//!     }
//!
//!     async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::empty(params.symbol.clone()))
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod csv_file;
pub mod yahoo;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar_series::BarSeries, request_params::BarsRequestParams};

use self::{
    alpaca_rest::{
        AlpacaOptions,
        params::{Adjustment, Feed},
        provider::AlpacaProvider,
    },
    csv_file::CsvFileProvider,
    yahoo::YahooProvider,
};

/// Trait for fetching daily bars from a market data provider.
///
/// The trait is designed for async usage and supports dynamic dispatch
/// (`Arc<dyn DataProvider>`) for runtime selection of providers.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short provider code used in logs (e.g. `"yahoo"`).
    fn name(&self) -> &'static str;

    /// Fetches daily bars for one symbol over an inclusive date range.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - possibly empty when the symbol exists but did not trade.
    /// * `Err(ProviderError)` - network failure, unknown symbol, bad payload.
    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The provider does not know the requested symbol.
    #[snafu(display("Unknown symbol '{symbol}'"))]
    UnknownSymbol {
        symbol: String,
        backtrace: Backtrace,
    },

    /// The request parameters or the payload shape were invalid for this provider.
    #[snafu(display("Invalid data for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// Reading a local data file failed.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A local data file is not valid CSV.
    #[snafu(display("Malformed CSV in {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },
}

/// Which provider to use, as it appears in configuration files.
///
/// ```toml
/// [provider]
/// kind = "csv"
/// path = "data/{symbol}.csv"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderKind {
    /// Yahoo Finance chart API. Needs no credentials.
    #[default]
    Yahoo,
    /// Alpaca market data API. Reads `APCA_API_KEY_ID` / `APCA_API_SECRET_KEY`.
    Alpaca {
        #[serde(default)]
        feed: Option<Feed>,
        #[serde(default)]
        adjustment: Option<Adjustment>,
    },
    /// Local OHLCV CSV file. `{symbol}` in the path is replaced by the ticker.
    Csv { path: String },
}

impl ProviderKind {
    /// Instantiates the configured provider.
    pub fn build(&self) -> Result<Arc<dyn DataProvider>, ProviderInitError> {
        Ok(match self {
            ProviderKind::Yahoo => Arc::new(YahooProvider::new()?),
            ProviderKind::Alpaca { feed, adjustment } => Arc::new(AlpacaProvider::new(AlpacaOptions {
                feed: *feed,
                adjustment: *adjustment,
            })?),
            ProviderKind::Csv { path } => Arc::new(CsvFileProvider::new(path.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    struct FixedProvider;

    #[async_trait]
    impl DataProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
            if params.symbol == "NOPE" {
                return UnknownSymbolSnafu {
                    symbol: params.symbol.clone(),
                }
                .fail();
            }
            Ok(BarSeries::empty(params.symbol.clone()))
        }
    }

    fn params(symbol: &str) -> BarsRequestParams {
        BarsRequestParams::new(
            symbol,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_dynamic_provider() {
        let provider: Arc<dyn DataProvider> = Arc::new(FixedProvider);

        let series = provider.fetch_bars(&params("AAPL")).await.unwrap();
        assert!(series.is_empty());

        let err = provider.fetch_bars(&params("NOPE")).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownSymbol { .. }));
        assert_eq!(err.to_string(), "Unknown symbol 'NOPE'");
    }

    #[test]
    fn provider_kind_defaults_to_yahoo() {
        assert_eq!(ProviderKind::default(), ProviderKind::Yahoo);
    }

    #[test]
    fn provider_kind_parses_from_toml() {
        let csv: ProviderKind = toml::from_str(
            r#"
            kind = "csv"
            path = "data/{symbol}.csv"
            "#,
        )
        .unwrap();
        assert_eq!(
            csv,
            ProviderKind::Csv {
                path: "data/{symbol}.csv".into()
            }
        );

        let alpaca: ProviderKind = toml::from_str(
            r#"
            kind = "alpaca"
            feed = "iex"
            "#,
        )
        .unwrap();
        assert_eq!(
            alpaca,
            ProviderKind::Alpaca {
                feed: Some(Feed::Iex),
                adjustment: None,
            }
        );
    }
}
