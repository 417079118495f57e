//! Trailing performance over fixed bar lookbacks.

use crate::error::{AppError, Result};
use crate::types::{Performance, PriceBar};

/// One trading month / quarter in bars.
pub const LOOKBACK_1M: usize = 21;
pub const LOOKBACK_3M: usize = 63;

/// Percentage change between the latest close and the close `n` bars prior.
pub fn performance(series: &[PriceBar], n: usize) -> Result<f64> {
    if series.len() < n + 1 {
        return Err(AppError::InsufficientData {
            needed: n + 1,
            got: series.len(),
        });
    }

    let latest = series[series.len() - 1].close;
    let past = series[series.len() - 1 - n].close;
    Ok((latest - past) / past * 100.0)
}

/// The 1-month and 3-month performance pair used by the classifier.
pub fn performance_set(series: &[PriceBar]) -> Result<Performance> {
    Ok(Performance {
        pct_1m: performance(series, LOOKBACK_1M)?,
        pct_3m: performance(series, LOOKBACK_3M)?,
    })
}
