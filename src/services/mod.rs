//! Core services: indicators, classification, clock, loop, reporting.

pub mod classifier;
pub mod indicators;
pub mod market_clock;
pub mod monitor;
pub mod report;

pub use market_clock::{MarketClock, SessionVariant};
pub use monitor::{Monitor, SchedulePolicy};
