//! Technical indicator library.
//!
//! Pure, deterministic functions over a chronological bar series. Nothing
//! here touches configuration, clocks, or I/O; insufficient input is the
//! only failure mode.

pub mod macd;
pub mod performance;
pub mod rsi;
pub mod support;
pub mod volatility;
pub mod volume;

pub use macd::macd;
pub use performance::{performance, performance_set, LOOKBACK_1M, LOOKBACK_3M};
pub use rsi::rsi;
pub use support::support_resistance;
pub use volatility::volatility;
pub use volume::volume_ratio;

use crate::error::Result;
use crate::types::{IndicatorSet, PriceBar};

/// Default parameterization, matching the classic daily-chart settings.
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const SR_LOOKBACK: usize = 20;
pub const VOLUME_LOOKBACK: usize = 20;

/// Compute the full per-symbol snapshot with default parameters.
///
/// Fails with the first `InsufficientData` encountered; the 3-month
/// performance lookback (64 bars) is the binding constraint in practice.
pub fn compute_indicator_set(series: &[PriceBar]) -> Result<IndicatorSet> {
    Ok(IndicatorSet {
        rsi: rsi(series, RSI_PERIOD)?,
        macd: macd(series, MACD_FAST, MACD_SLOW, MACD_SIGNAL)?,
        support_resistance: support_resistance(series, SR_LOOKBACK)?,
        volatility_annualized_pct: volatility(series)?,
        performance: performance_set(series)?,
        volume_ratio: volume_ratio(series, VOLUME_LOOKBACK)?,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use testutil::{downtrend_bars, uptrend_bars};

    #[test]
    fn test_indicator_set_needs_three_months() {
        let bars = uptrend_bars(63);
        assert!(compute_indicator_set(&bars).is_err());
        let bars = uptrend_bars(64);
        assert!(compute_indicator_set(&bars).is_ok());
    }

    #[test]
    fn test_indicator_set_is_deterministic() {
        let mut bars = uptrend_bars(50);
        bars.extend(downtrend_bars(30));
        let a = compute_indicator_set(&bars).unwrap();
        let b = compute_indicator_set(&bars).unwrap();
        assert_eq!(a.rsi, b.rsi);
        assert_eq!(a.macd.histogram, b.macd.histogram);
        assert_eq!(a.volatility_annualized_pct, b.volatility_annualized_pct);
        assert_eq!(a.performance.pct_3m, b.performance.pct_3m);
        assert_eq!(a.volume_ratio, b.volume_ratio);
    }
}
