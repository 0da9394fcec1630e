//! Yahoo Finance chart API (`/v8/finance/chart/{symbol}`), daily interval.

pub mod provider;
pub mod response;

pub use provider::YahooProvider;
