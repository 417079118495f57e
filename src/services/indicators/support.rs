//! Support/resistance distances over a trailing window.

use crate::error::{AppError, Result};
use crate::types::{PriceBar, SupportResistance};

/// A close within this percentage above the recent low counts as near support.
const NEAR_SUPPORT_PCT: f64 = 5.0;

/// Recent high/low over the trailing `lookback` bars and the latest
/// close's percent distance from each.
///
/// Uses the full series when it is shorter than `lookback`.
pub fn support_resistance(series: &[PriceBar], lookback: usize) -> Result<SupportResistance> {
    if series.is_empty() {
        return Err(AppError::InsufficientData { needed: 1, got: 0 });
    }

    let window = &series[series.len().saturating_sub(lookback)..];
    let recent_high = window.iter().map(|bar| bar.high).fold(f64::MIN, f64::max);
    let recent_low = window.iter().map(|bar| bar.low).fold(f64::MAX, f64::min);
    let close = series.last().unwrap().close;

    let pct_from_high = (close - recent_high) / recent_high * 100.0;
    let pct_from_low = (close - recent_low) / recent_low * 100.0;

    Ok(SupportResistance {
        recent_high,
        recent_low,
        pct_from_high,
        pct_from_low,
        near_support: pct_from_low < NEAR_SUPPORT_PCT,
    })
}
