use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    models::{bar::RawBar, bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, MissingEnvVarSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        alpaca_rest::{AlpacaOptions, params::construct_params, response::AlpacaResponse},
    },
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    options: AlpacaOptions,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(options: AlpacaOptions) -> Result<Self, ProviderInitError> {
        let api_key = SecretString::new(
            get_env_var("APCA_API_KEY_ID")
                .context(MissingEnvVarSnafu)?
                .into(),
        );
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(secret_key.expose_secret())
                .context(InvalidApiKeySnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            options,
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn name(&self) -> &'static str {
        "alpaca"
    }

    async fn fetch_bars(&self, params: &BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let mut rows: Vec<RawBar> = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let query_params = construct_params(params, &self.options, next_page_token.as_deref());
            debug!(symbol = %params.symbol, page = ?next_page_token, "requesting alpaca bars");

            let response = self
                .client
                .get(BASE_URL)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    message: format!("{status}: {body}"),
                }
                .fail();
            }

            let alpaca_response = response
                .json::<AlpacaResponse>()
                .await
                .context(ReqwestSnafu)?;

            // Only the requested symbol is ever asked for; other keys are ignored.
            if let Some(mut by_symbol) = alpaca_response.bars {
                if let Some(bars) = by_symbol.swap_remove(&params.symbol) {
                    rows.extend(bars.into_iter().map(|b| b.into_raw()));
                }
            }

            match alpaca_response.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }

        rows.retain(|r| r.date.is_some_and(|d| params.contains(d)));
        let (series, report) = BarSeries::from_raw(params.symbol.clone(), rows);
        if report.dropped() > 0 {
            tracing::warn!(symbol = %params.symbol, ?report, "dropped invalid alpaca rows");
        }
        Ok(series)
    }
}
