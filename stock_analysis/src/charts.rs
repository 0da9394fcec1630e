//! Serializable chart specifications for a finished report.
//!
//! Two charts are produced: price (OHLC candles with moving-average overlays)
//! and RSI (bounded 0-100 with overbought/oversold guides). The JSON is
//! renderer-agnostic; a plotting front end maps traces one-to-one.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use snafu::ResultExt;
use tracing::info;

use crate::{
    errors::{AnalysisError, ChartSnafu, WriteSnafu},
    indicators::IndicatorKind,
    pipeline::AnalysisReport,
};

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<NaiveDate>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Line {
        name: String,
        x: Vec<NaiveDate>,
        y: Vec<Option<f64>>,
        line: LineStyle,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Candlestick { name, .. } | Trace::Line { name, .. } => name,
        }
    }
}

/// Horizontal guide line at a fixed y value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub y_axis_title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
    pub traces: Vec<Trace>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_lines: Vec<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSet {
    pub price: Chart,
    pub rsi: Chart,
}

fn overlay_name(kind: IndicatorKind) -> String {
    match kind {
        IndicatorKind::Sma(w) => format!("{w}-Period SMA"),
        IndicatorKind::Ema(w) => format!("{w}-Period EMA"),
        IndicatorKind::Rsi(_) => "RSI".to_string(),
    }
}

impl ChartSet {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let series = &report.series;
        let cfg = &report.request.indicators;
        let symbol = &report.request.symbol;
        let x: Vec<NaiveDate> = series.rows().iter().map(|r| r.bar.date).collect();
        let bars = || series.rows().iter().map(|r| &r.bar);

        let line = |kind: IndicatorKind, style: LineStyle| Trace::Line {
            name: overlay_name(kind),
            x: x.clone(),
            y: series.column(kind),
            line: style,
        };

        let price = Chart {
            title: format!("{symbol} Price with Moving Averages"),
            y_axis_title: "Price (USD)",
            y_range: None,
            traces: vec![
                Trace::Candlestick {
                    name: "Price".to_string(),
                    x: x.clone(),
                    open: bars().map(|b| b.open).collect(),
                    high: bars().map(|b| b.high).collect(),
                    low: bars().map(|b| b.low).collect(),
                    close: bars().map(|b| b.close).collect(),
                },
                line(
                    cfg.short_sma_kind(),
                    LineStyle { color: "orange", width: 1.5, dash: None },
                ),
                line(
                    cfg.long_sma_kind(),
                    LineStyle { color: "purple", width: 1.5, dash: None },
                ),
                line(
                    cfg.ema_kind(),
                    LineStyle { color: "cyan", width: 1.5, dash: Some("dash") },
                ),
            ],
            reference_lines: Vec::new(),
        };

        let rsi = Chart {
            title: format!("{symbol} Relative Strength Index (RSI)"),
            y_axis_title: "RSI Value",
            y_range: Some([0.0, 100.0]),
            traces: vec![line(
                cfg.rsi_kind(),
                LineStyle { color: "lightgreen", width: 2.0, dash: None },
            )],
            reference_lines: vec![
                ReferenceLine { y: RSI_OVERBOUGHT, label: "Overbought", color: "red" },
                ReferenceLine { y: RSI_OVERSOLD, label: "Oversold", color: "green" },
            ],
        };

        Self { price, rsi }
    }

    pub fn to_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self).context(ChartSnafu)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), AnalysisError> {
        std::fs::write(path, self.to_json()?).context(WriteSnafu { path })?;
        info!(path = %path.display(), "Wrote chart spec");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::IndicatorConfig, pipeline::test_support::report_from_closes};

    fn wavy(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 5.0 * (i as f64 / 3.0).sin()).collect()
    }

    #[test]
    fn price_chart_has_candles_and_three_overlays() {
        let report = report_from_closes(&wavy(80), IndicatorConfig::default());
        let charts = ChartSet::from_report(&report);

        let names: Vec<&str> = charts.price.traces.iter().map(Trace::name).collect();
        assert_eq!(
            names,
            vec!["Price", "20-Period SMA", "50-Period SMA", "20-Period EMA"]
        );
        assert_eq!(charts.price.title, "TEST Price with Moving Averages");
        for trace in &charts.price.traces {
            if let Trace::Line { x, y, .. } = trace {
                assert_eq!(x.len(), report.series.len());
                assert!(y.iter().all(Option::is_some));
            }
        }
    }

    #[test]
    fn rsi_chart_is_bounded_with_guides() {
        let report = report_from_closes(&wavy(80), IndicatorConfig::default());
        let rsi = ChartSet::from_report(&report).rsi;

        assert_eq!(rsi.y_range, Some([0.0, 100.0]));
        let guides: Vec<(f64, &str)> = rsi.reference_lines.iter().map(|l| (l.y, l.label)).collect();
        assert_eq!(guides, vec![(70.0, "Overbought"), (30.0, "Oversold")]);
        assert_eq!(rsi.traces.len(), 1);
    }

    #[test]
    fn json_is_tagged_by_trace_type() {
        let report = report_from_closes(&wavy(60), IndicatorConfig::default());
        let json = ChartSet::from_report(&report).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["price"]["traces"][0]["type"], "candlestick");
        assert_eq!(value["price"]["traces"][3]["line"]["dash"], "dash");
        assert_eq!(value["rsi"]["traces"][0]["type"], "line");
        assert_eq!(value["rsi"]["reference_lines"][1]["y"], 30.0);
        assert!(value["price"].get("reference_lines").is_none());
        assert_eq!(value["price"]["traces"][0]["x"][0], "2024-02-19");
    }
}
