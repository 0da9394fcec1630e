//! Daily OHLCV acquisition: canonical bar models plus the providers that
//! fill them (Yahoo, Alpaca, local CSV).

pub mod models;
pub mod providers;
