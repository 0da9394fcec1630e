use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use reqwest::Client;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, ProviderError, ProviderInitError, ReqwestSnafu,
        UnknownSymbolSnafu, ValidationSnafu,
        yahoo::response::YahooResponse,
    },
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; stock-analysis/0.1)";

pub struct YahooProvider {
    client: Client,
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

impl YahooProvider {
    pub fn new() -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context(ClientBuildSnafu)?;
        Ok(Self { client })
    }

    /// Query parameters for one request. `period2` is exclusive upstream, so it
    /// is set to midnight after the last wanted day.
    pub fn query(params: &BarsRequestParams) -> Vec<(&'static str, String)> {
        let end = params
            .end
            .checked_add_days(Days::new(1))
            .unwrap_or(params.end);
        vec![
            ("period1", unix_midnight(params.start).to_string()),
            ("period2", unix_midnight(end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ]
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let url = format!("{BASE_URL}/{}", params.symbol);
        debug!(%url, start = %params.start, end = %params.end, "requesting yahoo chart");

        let response = self
            .client
            .get(&url)
            .query(&Self::query(params))
            .send()
            .await
            .context(ReqwestSnafu)?;

        // Error payloads (e.g. 404 for unknown tickers) still carry a chart body.
        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;
        let parsed: YahooResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return ApiSnafu {
                    message: format!("{status}: {body}"),
                }
                .fail();
            }
            Err(e) => {
                return ValidationSnafu {
                    message: format!("unexpected chart payload: {e}"),
                }
                .fail();
            }
        };

        if let Some(err) = parsed.chart.error {
            if err.is_not_found() {
                return UnknownSymbolSnafu {
                    symbol: params.symbol.clone(),
                }
                .fail();
            }
            return ApiSnafu {
                message: format!("{}: {}", err.code, err.description),
            }
            .fail();
        }

        let Some(data) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
            return UnknownSymbolSnafu {
                symbol: params.symbol.clone(),
            }
            .fail();
        };

        let mut rows = data.into_rows();
        rows.retain(|r| r.date.is_some_and(|d| params.contains(d)));
        let (series, report) = BarSeries::from_raw(params.symbol.clone(), rows);
        if report.dropped() > 0 {
            warn!(symbol = %params.symbol, ?report, "dropped invalid yahoo rows");
        }
        debug!(symbol = %params.symbol, rows = series.len(), "yahoo chart parsed");
        Ok(series)
    }
}
