//! Price bar types shared by the price source and the indicator library.

/// One OHLCV bar for a trading session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    /// Unix timestamp in seconds (bar open).
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronologically ordered bar sequence for one symbol.
pub type PriceSeries = Vec<PriceBar>;

/// Everything the price source returns for one symbol in one cycle.
#[derive(Debug, Clone)]
pub struct SymbolData {
    pub symbol: String,
    pub series: PriceSeries,
    /// Long company name when the source reports one.
    pub company_name: Option<String>,
    /// Market capitalization in dollars when the source reports one.
    pub market_cap: Option<f64>,
}

impl SymbolData {
    /// Latest close, if the series is non-empty.
    pub fn last_close(&self) -> Option<f64> {
        self.series.last().map(|bar| bar.close)
    }
}
