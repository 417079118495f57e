//! Volume ratio against the trailing average.

use crate::error::{AppError, Result};
use crate::types::PriceBar;

/// Latest bar volume over the mean volume of the trailing `lookback` bars.
///
/// Above 1.0 means today is trading heavier than the recent average.
/// Returns 0.0 when the window has no volume at all.
pub fn volume_ratio(series: &[PriceBar], lookback: usize) -> Result<f64> {
    if series.is_empty() {
        return Err(AppError::InsufficientData { needed: 1, got: 0 });
    }

    let window = &series[series.len().saturating_sub(lookback)..];
    let avg = window.iter().map(|bar| bar.volume).sum::<f64>() / window.len() as f64;
    if avg == 0.0 {
        return Ok(0.0);
    }

    Ok(series.last().unwrap().volume / avg)
}
