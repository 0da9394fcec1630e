//! Presentation adapter: renders a finished [`AnalysisReport`].

use std::io::Write;

use snafu::ResultExt;

use crate::{
    errors::{AnalysisError, PresentSnafu},
    pipeline::AnalysisReport,
};

/// Something that shows a report to a user.
pub trait Presenter {
    fn present(&mut self, report: &AnalysisReport) -> Result<(), AnalysisError>;
}

/// `$1,234.56`
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Ratio as a percentage, `0.1234` -> `12.34%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Plain-text report: headline metrics, then the data table.
pub struct ConsolePresenter<W: Write> {
    out: W,
    table: bool,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out, table: true }
    }

    /// Whether to print the per-day table after the summary.
    pub fn with_table(mut self, table: bool) -> Self {
        self.table = table;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn table_lines(report: &AnalysisReport) -> Vec<String> {
        let series = &report.series;
        let mut header: Vec<String> = ["Date", "Open", "High", "Low", "Close", "Volume"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(series.kinds().iter().map(ToString::to_string));

        let rows: Vec<Vec<String>> = series
            .rows()
            .iter()
            .map(|row| {
                let bar = &row.bar;
                let mut cells = vec![
                    bar.date.to_string(),
                    format!("{:.2}", bar.open),
                    format!("{:.2}", bar.high),
                    format!("{:.2}", bar.low),
                    format!("{:.2}", bar.close),
                    bar.volume.to_string(),
                ];
                cells.extend(row.indicators.values().map(|v| match v {
                    Some(v) => format!("{v:.2}"),
                    None => "-".to_string(),
                }));
                cells
            })
            .collect();

        let widths: Vec<usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| {
                rows.iter()
                    .filter_map(|r| r.get(i))
                    .map(String::len)
                    .fold(h.len(), usize::max)
            })
            .collect();

        let render = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (c, w))| {
                    if i == 0 {
                        format!("{c:<w$}")
                    } else {
                        format!("{c:>w$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        std::iter::once(render(&header))
            .chain(rows.iter().map(|r| render(r)))
            .collect()
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present(&mut self, report: &AnalysisReport) -> Result<(), AnalysisError> {
        let s = &report.summary;
        let out = &mut self.out;

        writeln!(out, "Analysis for {}", report.request.symbol).context(PresentSnafu)?;
        writeln!(
            out,
            "Period: {} to {}, {} trading days",
            s.start_date,
            s.end_date,
            report.series.len()
        )
        .context(PresentSnafu)?;
        writeln!(out).context(PresentSnafu)?;

        for (label, value) in [
            ("Start Price", format_money(s.start_price)),
            ("End Price", format_money(s.end_price)),
            ("Total Return", format_percent(s.total_return)),
            ("Annualized Volatility", format_percent(s.annualized_volatility)),
        ] {
            writeln!(out, "{label:<23}{value}").context(PresentSnafu)?;
        }

        if self.table {
            writeln!(out).context(PresentSnafu)?;
            for line in Self::table_lines(report) {
                writeln!(out, "{line}").context(PresentSnafu)?;
            }
        }
        out.flush().context(PresentSnafu)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use market_data_ingestor::models::bar::Bar;

    use super::*;
    use crate::{
        config::{AnalysisRequest, IndicatorConfig},
        indicators::{EnrichedBar, EnrichedSeries, IndicatorKind},
        summary::Summary,
    };

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(185.64), "$185.64");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-12.0), "-$12.00");
        assert_eq!(format_money(0.0), "$0.00");
    }

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(format_percent(0.25), "25.00%");
        assert_eq!(format_percent(-0.0075), "-0.75%");
        assert_eq!(format_percent(0.0), "0.00%");
    }

    fn row(
        day: u32,
        ohlc: [f64; 4],
        volume: u64,
        sma: f64,
        ema: f64,
        rsi: f64,
    ) -> EnrichedBar {
        let mut indicators = IndexMap::new();
        indicators.insert(IndicatorKind::Sma(20), Some(sma));
        indicators.insert(IndicatorKind::Ema(20), Some(ema));
        indicators.insert(IndicatorKind::Rsi(14), Some(rsi));
        EnrichedBar {
            bar: Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: ohlc[0],
                high: ohlc[1],
                low: ohlc[2],
                close: ohlc[3],
                volume,
            },
            indicators,
        }
    }

    fn report() -> AnalysisReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        AnalysisReport {
            request: AnalysisRequest::new("aapl", start, end, IndicatorConfig::default()),
            series: EnrichedSeries {
                symbol: "AAPL".into(),
                kinds: vec![
                    IndicatorKind::Sma(20),
                    IndicatorKind::Ema(20),
                    IndicatorKind::Rsi(14),
                ],
                rows: vec![
                    row(2, [187.15, 188.44, 183.89, 185.64], 82_488_700, 190.1234, 189.5, 41.987),
                    row(3, [184.22, 185.88, 183.43, 184.25], 58_414_500, 189.9, 188.98765, 38.4),
                ],
            },
            summary: Summary {
                start_date: start,
                end_date: end,
                start_price: 185.64,
                end_price: 184.25,
                total_return: -0.0075,
                annualized_volatility: 0.25,
                observations: 1,
            },
            dropped_rows: 49,
        }
    }

    #[test]
    fn console_report() {
        let mut presenter = ConsolePresenter::new(Vec::new());
        presenter.present(&report()).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();

        insta::assert_snapshot!(text, @r"
        Analysis for AAPL
        Period: 2024-01-02 to 2024-01-03, 2 trading days

        Start Price            $185.64
        End Price              $184.25
        Total Return           -0.75%
        Annualized Volatility  25.00%

        Date          Open    High     Low   Close    Volume  SMA_20  EMA_20  RSI_14
        2024-01-02  187.15  188.44  183.89  185.64  82488700  190.12  189.50   41.99
        2024-01-03  184.22  185.88  183.43  184.25  58414500  189.90  188.99   38.40
        ");
    }

    #[test]
    fn table_can_be_suppressed() {
        let mut presenter = ConsolePresenter::new(Vec::new()).with_table(false);
        presenter.present(&report()).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.ends_with("Annualized Volatility  25.00%\n"));
        assert!(!text.contains("SMA_20"));
    }
}
