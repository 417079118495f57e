//! Annualized volatility of daily returns.

use crate::error::{AppError, Result};
use crate::types::PriceBar;

/// Trading days per year used for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Sample standard deviation of daily percentage returns over the full
/// series, annualized by sqrt(252), as a percentage.
pub fn volatility(series: &[PriceBar]) -> Result<f64> {
    // Two returns are the minimum for a sample deviation.
    if series.len() < 3 {
        return Err(AppError::InsufficientData {
            needed: 3,
            got: series.len(),
        });
    }

    let returns: Vec<f64> = series
        .windows(2)
        .map(|pair| (pair[1].close - pair[0].close) / pair[0].close)
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Ok(variance.sqrt() * TRADING_DAYS.sqrt() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::testutil::{bar_at, flat_bars};

    #[test]
    fn test_volatility_insufficient_data() {
        let bars = flat_bars(2);
        assert!(volatility(&bars).is_err());
    }

    #[test]
    fn test_flat_series_has_zero_volatility() {
        let bars = flat_bars(30);
        assert!(volatility(&bars).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_constant_return_has_zero_volatility() {
        // Identical percentage moves every day: deviation of returns is 0.
        let bars: Vec<_> = (0..20)
            .map(|i| bar_at(i as i64 * 86_400, 100.0 * 1.01f64.powi(i)))
            .collect();
        assert!(volatility(&bars).unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_alternating_moves_are_volatile() {
        let bars: Vec<_> = (0..30)
            .map(|i| {
                let close = if i % 2 == 0 { 100.0 } else { 105.0 };
                bar_at(i as i64 * 86_400, close)
            })
            .collect();
        let vol = volatility(&bars).unwrap();
        assert!(vol > 50.0, "alternating ±5% should annualize high, got {vol}");
    }
}
