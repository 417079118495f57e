//! Vigil - market-hours-aware stock watch-list monitor.
//!
//! Periodically evaluates a watch-list of tickers against technical
//! signals (RSI, MACD, support proximity, volatility, performance) and
//! sends ranked Telegram alerts for accumulation opportunities.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;
