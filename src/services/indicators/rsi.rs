//! Relative Strength Index (RSI).

use crate::error::{AppError, Result};
use crate::types::PriceBar;

/// RSI over a simple rolling mean of gains and losses.
///
/// Measures momentum by comparing the magnitude of recent gains to recent
/// losses. Values range 0-100; below 30 is conventionally oversold.
///
/// Uses the plain mean of the last `period` gains/losses rather than
/// Wilder's smoothed averages. When the window has no losses the division
/// is undefined and the function returns 100.0 (maximal reading) instead
/// of NaN.
pub fn rsi(series: &[PriceBar], period: usize) -> Result<f64> {
    if series.len() < period + 1 {
        return Err(AppError::InsufficientData {
            needed: period + 1,
            got: series.len(),
        });
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in series.len() - period..series.len() {
        let change = series[i].close - series[i - 1].close;
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum += -change;
        }
    }

    let mean_gain = gain_sum / period as f64;
    let mean_loss = loss_sum / period as f64;

    if mean_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = mean_gain / mean_loss;
    Ok(100.0 - 100.0 / (1.0 + rs))
}
