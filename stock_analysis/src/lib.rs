//! Indicator and analytics pipeline for daily OHLCV series.
//!
//! A [`pipeline::Pipeline`] takes an [`config::AnalysisRequest`], fetches bars
//! through a [`cache::SeriesCache`], annotates them with SMA/EMA/RSI, drops the
//! warm-up rows and summarizes return and volatility. Presentation (console
//! report, chart specs, CSV) consumes the resulting
//! [`pipeline::AnalysisReport`].

pub mod alignment;
pub mod cache;
pub mod charts;
pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod indicators;
pub mod pipeline;
pub mod presenter;
pub mod summary;
