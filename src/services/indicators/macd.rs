//! MACD (Moving Average Convergence Divergence).

use crate::error::{AppError, Result};
use crate::types::{MacdOutput, PriceBar};

/// Exponential moving average with the given span.
///
/// Recursive form seeded with the first value, alpha = 2 / (span + 1).
fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);
    for &value in &values[1..] {
        let prev = *out.last().unwrap();
        out.push(prev + alpha * (value - prev));
    }
    out
}

/// MACD snapshot at the latest bar.
///
/// - line = EMA(close, fast) - EMA(close, slow)
/// - signal = EMA(line, signal_span)
/// - histogram = line - signal
///
/// `bullish_crossover` is the instantaneous `line > signal` comparison at
/// the latest bar, not a crossing-edge detector.
pub fn macd(series: &[PriceBar], fast: usize, slow: usize, signal_span: usize) -> Result<MacdOutput> {
    let needed = slow + signal_span;
    if series.len() < needed {
        return Err(AppError::InsufficientData {
            needed,
            got: series.len(),
        });
    }

    let closes: Vec<f64> = series.iter().map(|bar| bar.close).collect();
    let fast_ema = ema(&closes, fast);
    let slow_ema = ema(&closes, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal_span);

    let line_now = *line.last().unwrap();
    let signal_now = *signal_line.last().unwrap();

    Ok(MacdOutput {
        line: line_now,
        signal: signal_now,
        histogram: line_now - signal_now,
        bullish_crossover: line_now > signal_now,
    })
}
