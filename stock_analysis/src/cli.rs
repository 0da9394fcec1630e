//! Command-line surface of the `stock-analysis` binary.
//!
//! Flags override the TOML config file, which overrides built-in defaults.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use market_data_ingestor::providers::ProviderKind;

use crate::config::{AnalysisRequest, AppConfig, ConfigError, OutputSection};

#[derive(Debug, Parser)]
#[command(version, about = "Daily stock indicators and performance summary")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Fetch one instrument, compute indicators and print the summary.
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderChoice {
    Yahoo,
    Alpaca,
    Csv,
}

#[derive(Debug, Default, Args)]
pub struct AnalyzeArgs {
    /// TOML config file.
    #[arg(long, value_name = "FILE", env = "STOCK_ANALYSIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ticker symbol, e.g. AAPL (case-insensitive).
    #[arg(long)]
    pub symbol: Option<String>,

    /// First day, YYYY-MM-DD.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day (inclusive), YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, value_name = "DAYS")]
    pub short_sma: Option<usize>,

    #[arg(long, value_name = "DAYS")]
    pub long_sma: Option<usize>,

    #[arg(long, value_name = "DAYS")]
    pub ema: Option<usize>,

    #[arg(long, value_name = "DAYS")]
    pub rsi: Option<usize>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderChoice>,

    /// CSV source path; `{symbol}` is replaced by the ticker. Implies `--provider csv`.
    #[arg(long, value_name = "PATH")]
    pub csv_path: Option<String>,

    /// Export the aligned series as CSV to this file or directory.
    #[arg(long, value_name = "FILE|DIR")]
    pub csv_out: Option<PathBuf>,

    /// Write the chart spec JSON here.
    #[arg(long, value_name = "FILE")]
    pub chart_out: Option<PathBuf>,

    /// Print only the summary, not the data table.
    #[arg(long)]
    pub no_table: bool,
}

/// A fully resolved run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub request: AnalysisRequest,
    pub provider: ProviderKind,
    pub output: OutputSection,
}

impl AnalyzeArgs {
    /// Loads the config file (if any) and applies the flags on top.
    pub fn resolve(&self, today: NaiveDate) -> Result<RunPlan, ConfigError> {
        let base = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        self.merge(base, today)
    }

    pub fn merge(&self, mut cfg: AppConfig, today: NaiveDate) -> Result<RunPlan, ConfigError> {
        if let Some(symbol) = &self.symbol {
            cfg.request.symbol = symbol.clone();
        }
        if let Some(start) = self.start {
            cfg.request.start = start;
        }
        if let Some(end) = self.end {
            cfg.request.end = Some(end);
        }

        let ind = &mut cfg.indicators;
        ind.short_sma = self.short_sma.unwrap_or(ind.short_sma);
        ind.long_sma = self.long_sma.unwrap_or(ind.long_sma);
        ind.ema = self.ema.unwrap_or(ind.ema);
        ind.rsi = self.rsi.unwrap_or(ind.rsi);

        if self.csv_out.is_some() {
            cfg.output.csv = self.csv_out.clone();
        }
        if self.chart_out.is_some() {
            cfg.output.chart = self.chart_out.clone();
        }
        if self.no_table {
            cfg.output.table = false;
        }

        let provider = self.provider_kind(cfg.provider.clone())?;
        Ok(RunPlan {
            request: cfg.request(today),
            provider,
            output: cfg.output,
        })
    }

    fn provider_kind(&self, from_file: ProviderKind) -> Result<ProviderKind, ConfigError> {
        match (self.provider, &self.csv_path) {
            (None, None) => Ok(from_file),
            (None | Some(ProviderChoice::Csv), Some(path)) => Ok(ProviderKind::Csv { path: path.clone() }),
            (Some(ProviderChoice::Csv), None) => match from_file {
                csv @ ProviderKind::Csv { .. } => Ok(csv),
                _ => Err(ConfigError::MissingCsvPath),
            },
            (Some(ProviderChoice::Yahoo), _) => Ok(ProviderKind::Yahoo),
            (Some(ProviderChoice::Alpaca), _) => match from_file {
                alpaca @ ProviderKind::Alpaca { .. } => Ok(alpaca),
                _ => Ok(ProviderKind::Alpaca {
                    feed: None,
                    adjustment: None,
                }),
            },
        }
    }
}
