//! Run configuration: indicator windows, the request being analyzed, and the
//! TOML file that can carry both.
//!
//! Values are plain data handed to [`Pipeline::run`](crate::pipeline::Pipeline::run);
//! nothing here is global. Validation happens up front so an out-of-range
//! window never costs a network round trip.
//!
//! ```toml
//! [request]
//! symbol = "msft"
//! start = "2023-01-01"
//! end = "2024-06-30"
//!
//! [indicators]
//! short_sma = 20
//! long_sma = 100
//! ema = 20
//! rsi = 14
//!
//! [provider]
//! kind = "yahoo"
//!
//! [output]
//! csv = "exports/"
//! chart = "charts.json"
//! table = false
//! ```

use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use market_data_ingestor::{models::request_params::BarsRequestParams, providers::ProviderKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::IndicatorKind;

pub const SHORT_SMA_BOUNDS: RangeInclusive<usize> = 5..=50;
pub const LONG_SMA_BOUNDS: RangeInclusive<usize> = 50..=200;
pub const EMA_BOUNDS: RangeInclusive<usize> = 5..=50;
pub const RSI_BOUNDS: RangeInclusive<usize> = 7..=30;

/// Errors related to run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} window must be between {} and {}, got {value}", bounds.start(), bounds.end())]
    WindowOutOfRange {
        name: &'static str,
        value: usize,
        bounds: RangeInclusive<usize>,
    },

    #[error("instrument symbol must not be empty")]
    EmptySymbol,

    #[error("the csv provider needs a file path (--csv-path or [provider] path)")]
    MissingCsvPath,

    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Window lengths for the four configured indicators.
///
/// `short_sma <= long_sma` is deliberately not required; the two windows may
/// even be equal, in which case one `SMA_<w>` column serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    pub short_sma: usize,
    pub long_sma: usize,
    pub ema: usize,
    pub rsi: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            short_sma: 20,
            long_sma: 50,
            ema: 20,
            rsi: 14,
        }
    }
}

fn check(
    name: &'static str,
    value: usize,
    bounds: RangeInclusive<usize>,
) -> Result<(), ConfigError> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::WindowOutOfRange {
            name,
            value,
            bounds,
        })
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("short SMA", self.short_sma, SHORT_SMA_BOUNDS)?;
        check("long SMA", self.long_sma, LONG_SMA_BOUNDS)?;
        check("EMA", self.ema, EMA_BOUNDS)?;
        check("RSI", self.rsi, RSI_BOUNDS)
    }

    pub fn short_sma_kind(&self) -> IndicatorKind {
        IndicatorKind::Sma(self.short_sma)
    }

    pub fn long_sma_kind(&self) -> IndicatorKind {
        IndicatorKind::Sma(self.long_sma)
    }

    pub fn ema_kind(&self) -> IndicatorKind {
        IndicatorKind::Ema(self.ema)
    }

    pub fn rsi_kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi(self.rsi)
    }

    /// Configured indicators in column order, duplicates removed.
    pub fn kinds(&self) -> Vec<IndicatorKind> {
        let mut kinds = Vec::with_capacity(4);
        for kind in [
            self.short_sma_kind(),
            self.long_sma_kind(),
            self.ema_kind(),
            self.rsi_kind(),
        ] {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Number of bars needed before every indicator has a value.
    pub fn required_bars(&self) -> usize {
        self.kinds()
            .iter()
            .map(|k| k.first_defined_index() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// One analysis: which instrument, which days, which windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Uppercased ticker.
    pub symbol: String,
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    pub indicators: IndicatorConfig,
}

impl AnalysisRequest {
    /// Builds a request, trimming and uppercasing the symbol.
    pub fn new(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        indicators: IndicatorConfig,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            start,
            end,
            indicators,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if self.start > self.end {
            return Err(ConfigError::InvertedDateRange {
                start: self.start,
                end: self.end,
            });
        }
        self.indicators.validate()
    }

    pub fn bars_params(&self) -> BarsRequestParams {
        BarsRequestParams::new(self.symbol.clone(), self.start, self.end)
    }

    /// `AAPL_stock_data_2023-01-01_to_2024-01-01.csv`
    pub fn export_file_name(&self) -> String {
        format!(
            "{}_stock_data_{}_to_{}.csv",
            self.symbol, self.start, self.end
        )
    }
}

fn default_symbol() -> String {
    "AAPL".to_string()
}

fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSection {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_start")]
    pub start: NaiveDate,
    /// Defaults to today when absent.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            start: default_start(),
            end: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// CSV export target: a file, or a directory receiving the default file name.
    #[serde(default)]
    pub csv: Option<PathBuf>,
    /// Chart spec JSON target.
    #[serde(default)]
    pub chart: Option<PathBuf>,
    /// Print the data table after the summary.
    #[serde(default = "default_true")]
    pub table: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            csv: None,
            chart: None,
            table: true,
        }
    }
}

/// Everything a run can be configured with, as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub request: RequestSection,
    pub indicators: IndicatorConfig,
    pub provider: ProviderKind,
    pub output: OutputSection,
}

impl AppConfig {
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// The request this config describes; `today` fills a missing end date.
    pub fn request(&self, today: NaiveDate) -> AnalysisRequest {
        AnalysisRequest::new(
            &self.request.symbol,
            self.request.start,
            self.request.end.unwrap_or(today),
            self.indicators,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        IndicatorConfig::default().validate().unwrap();
        assert_eq!(IndicatorConfig::default().required_bars(), 50);
    }

    #[test]
    fn each_window_is_bounded() {
        let base = IndicatorConfig::default();
        let cases = [
            IndicatorConfig { short_sma: 4, ..base },
            IndicatorConfig { short_sma: 51, ..base },
            IndicatorConfig { long_sma: 49, ..base },
            IndicatorConfig { long_sma: 201, ..base },
            IndicatorConfig { ema: 4, ..base },
            IndicatorConfig { ema: 51, ..base },
            IndicatorConfig { rsi: 6, ..base },
            IndicatorConfig { rsi: 31, ..base },
        ];
        for cfg in cases {
            let err = cfg.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::WindowOutOfRange { .. }),
                "{cfg:?} should be rejected"
            );
        }

        let edges = IndicatorConfig {
            short_sma: 50,
            long_sma: 200,
            ema: 5,
            rsi: 30,
        };
        edges.validate().unwrap();
    }

    #[test]
    fn error_message_names_the_window() {
        let err = IndicatorConfig {
            rsi: 3,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "RSI window must be between 7 and 30, got 3");
    }

    #[test]
    fn equal_sma_windows_share_one_column() {
        let cfg = IndicatorConfig {
            short_sma: 50,
            long_sma: 50,
            ema: 20,
            rsi: 14,
        };
        assert_eq!(
            cfg.kinds(),
            vec![
                IndicatorKind::Sma(50),
                IndicatorKind::Ema(20),
                IndicatorKind::Rsi(14)
            ]
        );
    }

    #[test]
    fn sma_ordering_is_not_enforced() {
        let cfg = IndicatorConfig {
            short_sma: 50,
            long_sma: 50,
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn rsi_needs_one_extra_bar() {
        let cfg = IndicatorConfig {
            short_sma: 5,
            long_sma: 50,
            ema: 5,
            rsi: 30,
        };
        assert_eq!(cfg.required_bars(), 50);
        assert_eq!(IndicatorKind::Rsi(30).first_defined_index(), 30);
    }

    #[test]
    fn request_uppercases_and_validates() {
        let req = AnalysisRequest::new(
            "  aapl ",
            date(2023, 1, 1),
            date(2023, 12, 31),
            IndicatorConfig::default(),
        );
        assert_eq!(req.symbol, "AAPL");
        req.validate().unwrap();
        assert_eq!(
            req.export_file_name(),
            "AAPL_stock_data_2023-01-01_to_2023-12-31.csv"
        );

        let blank = AnalysisRequest::new(" ", date(2023, 1, 1), date(2023, 1, 2), Default::default());
        assert!(matches!(blank.validate(), Err(ConfigError::EmptySymbol)));

        let inverted = AnalysisRequest::new("X", date(2023, 2, 1), date(2023, 1, 1), Default::default());
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn toml_sections_are_optional() {
        let cfg = AppConfig::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.output.table);

        let req = cfg.request(date(2024, 5, 1));
        assert_eq!(req.symbol, "AAPL");
        assert_eq!(req.start, date(2023, 1, 1));
        assert_eq!(req.end, date(2024, 5, 1));
    }

    #[test]
    fn toml_overrides_are_read() {
        let text = r#"
            [request]
            symbol = "msft"
            start = "2022-03-01"
            end = "2022-09-30"

            [indicators]
            long_sma = 100

            [provider]
            kind = "csv"
            path = "data/{symbol}.csv"

            [output]
            csv = "exports"
            table = false
        "#;
        let cfg = AppConfig::from_toml_str(text, Path::new("run.toml")).unwrap();
        let req = cfg.request(date(2030, 1, 1));

        assert_eq!(req.symbol, "MSFT");
        assert_eq!(req.end, date(2022, 9, 30));
        assert_eq!(req.indicators.long_sma, 100);
        assert_eq!(req.indicators.short_sma, 20);
        assert_eq!(
            cfg.provider,
            ProviderKind::Csv {
                path: "data/{symbol}.csv".into()
            }
        );
        assert_eq!(cfg.output.csv, Some(PathBuf::from("exports")));
        assert!(!cfg.output.table);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[indicators]\nmacd = 9\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
