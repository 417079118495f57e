//! Yahoo Finance chart API price source.
//!
//! Daily OHLCV history via the unofficial v8 chart endpoint. No API key;
//! the only courtesy is a desktop user agent and the inter-symbol delay
//! the evaluation loop already applies.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::{PriceBar, SymbolData};

use super::PriceSource;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    long_name: Option<String>,
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Yahoo uses hyphens instead of dots for share classes (BRK-B, not BRK.B).
fn normalize_symbol(symbol: &str) -> String {
    symbol.to_uppercase().replace('.', "-")
}

/// Yahoo Finance price source.
pub struct YahooFinanceSource {
    client: Client,
    /// History range per fetch ("3mo", "6mo", ...).
    range: String,
}

impl YahooFinanceSource {
    pub fn new(range: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| AppError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            range: range.to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for YahooFinanceSource {
    async fn fetch(&self, symbol: &str) -> Result<SymbolData> {
        let yahoo_symbol = normalize_symbol(symbol);
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}?range={}&interval=1d&includePrePost=false",
            yahoo_symbol, self.range
        );

        debug!(symbol, "fetching daily history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("{symbol}: request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "{symbol}: API status {}",
                response.status()
            )));
        }

        let data: ChartResponse = response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("{symbol}: parse error: {e}")))?;

        if let Some(error) = data.chart.error {
            return Err(AppError::Fetch(format!(
                "{symbol}: {} - {}",
                error.code, error.description
            )));
        }

        let result = data
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| AppError::Fetch(format!("{symbol}: empty chart result")))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| AppError::Fetch(format!("{symbol}: no timestamps")))?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Fetch(format!("{symbol}: no quote data")))?;

        let opens = quote.open.unwrap_or_default();
        let highs = quote.high.unwrap_or_default();
        let lows = quote.low.unwrap_or_default();
        let closes = quote.close.unwrap_or_default();
        let volumes = quote.volume.unwrap_or_default();

        // Yahoo pads sessions it has no data for with nulls; skip those bars.
        let mut series = Vec::with_capacity(timestamps.len());
        for (i, &timestamp) in timestamps.iter().enumerate() {
            let bar = (
                opens.get(i).copied().flatten(),
                highs.get(i).copied().flatten(),
                lows.get(i).copied().flatten(),
                closes.get(i).copied().flatten(),
            );
            if let (Some(open), Some(high), Some(low), Some(close)) = bar {
                series.push(PriceBar {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume: volumes.get(i).copied().flatten().unwrap_or(0.0),
                });
            }
        }

        if series.is_empty() {
            return Err(AppError::Fetch(format!("{symbol}: no usable bars")));
        }

        Ok(SymbolData {
            symbol: result.meta.symbol,
            series,
            company_name: result.meta.long_name,
            market_cap: result.meta.market_cap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("brk.b"), "BRK-B");
        assert_eq!(normalize_symbol("AAPL"), "AAPL");
    }

    #[test]
    fn test_chart_response_parsing_skips_null_bars() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "XYZ", "longName": "Xyz Corp", "marketCap": 12000000000.0},
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {"quote": [{
                        "open": [10.0, null, 11.0],
                        "high": [10.5, null, 11.5],
                        "low": [9.5, null, 10.5],
                        "close": [10.2, null, 11.2],
                        "volume": [1000.0, null, 1500.0]
                    }]}
                }],
                "error": null
            }
        }"#;

        let parsed: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = &parsed.chart.result.as_ref().unwrap()[0];
        assert_eq!(result.meta.symbol, "XYZ");
        assert_eq!(result.meta.long_name.as_deref(), Some("Xyz Corp"));
        assert_eq!(result.timestamp.as_ref().unwrap().len(), 3);
        // Second bar is all nulls and would be dropped by fetch().
        assert!(result.indicators.quote[0].close.as_ref().unwrap()[1].is_none());
    }

    #[test]
    fn test_chart_error_parsing() {
        let raw = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(raw).unwrap();
        let error = parsed.chart.error.unwrap();
        assert_eq!(error.code, "Not Found");
        assert_eq!(error.description, "No data found");
    }
}
