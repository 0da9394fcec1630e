use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{models::request_params::BarsRequestParams, providers::alpaca_rest::AlpacaOptions};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
}

impl Adjustment {
    fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

impl Feed {
    fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
        }
    }
}

/// Page size requested from Alpaca; the API caps it at 10 000.
pub const PAGE_LIMIT: u32 = 10_000;

fn rfc3339_midnight(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN).and_utc().to_rfc3339()
}

/// Builds the query string for one page of a daily-bars request.
///
/// Alpaca treats `end` as a timestamp bound, so the request runs to midnight
/// UTC after the last wanted day and the provider filters by date afterwards.
pub fn construct_params(
    params: &BarsRequestParams,
    options: &AlpacaOptions,
    page_token: Option<&str>,
) -> Vec<(String, String)> {
    let end = params
        .end
        .checked_add_days(Days::new(1))
        .unwrap_or(params.end);

    let mut query = vec![
        ("symbols".to_string(), params.symbol.clone()),
        ("timeframe".to_string(), "1Day".to_string()),
        ("start".to_string(), rfc3339_midnight(params.start)),
        ("end".to_string(), rfc3339_midnight(end)),
        ("limit".to_string(), PAGE_LIMIT.to_string()),
        ("sort".to_string(), "asc".to_string()),
    ];
    if let Some(feed) = options.feed {
        query.push(("feed".to_string(), feed.as_str().to_string()));
    }
    if let Some(adjustment) = options.adjustment {
        query.push(("adjustment".to_string(), adjustment.as_str().to_string()));
    }
    if let Some(token) = page_token {
        query.push(("page_token".to_string(), token.to_string()));
    }
    query
}
