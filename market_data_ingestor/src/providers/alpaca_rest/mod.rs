//! Alpaca market data REST API (`/v2/stocks/bars`, daily timeframe only).

pub mod params;
pub mod provider;
pub mod response;

use serde::{Deserialize, Serialize};

use self::params::{Adjustment, Feed};

/// Optional knobs forwarded to Alpaca on every request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlpacaOptions {
    pub feed: Option<Feed>,
    pub adjustment: Option<Adjustment>,
}
