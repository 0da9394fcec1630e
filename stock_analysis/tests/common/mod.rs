#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use market_data_ingestor::{
    models::{bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{DataProvider, ProviderError, UnknownSymbolSnafu},
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First bar date used by [`bars_from_closes`].
pub fn first_day() -> NaiveDate {
    date(2023, 1, 2)
}

/// One bar per consecutive calendar day from [`first_day`].
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: first_day() + Days::new(i as u64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10_000,
        })
        .collect()
}

pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 8.0 * (i as f64 / 5.0).sin() + i as f64 * 0.05)
        .collect()
}

/// In-memory provider that counts calls.
#[derive(Default)]
pub struct CountingProvider {
    bars: HashMap<String, Vec<Bar>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, symbol: &str, closes: &[f64]) -> Self {
        self.bars.insert(symbol.to_string(), bars_from_closes(closes));
        self
    }

    /// Every fetch for `symbol` fails as an unknown symbol.
    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for CountingProvider {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&params.symbol) {
            return UnknownSymbolSnafu {
                symbol: params.symbol.clone(),
            }
            .fail();
        }
        let Some(bars) = self.bars.get(&params.symbol) else {
            return UnknownSymbolSnafu {
                symbol: params.symbol.clone(),
            }
            .fail();
        };
        let in_range = bars.iter().filter(|b| params.contains(b.date)).cloned().collect();
        Ok(BarSeries::from_bars(params.symbol.clone(), in_range))
    }
}
