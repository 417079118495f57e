//! External capabilities: market data in, notifications out.

pub mod telegram;
pub mod yahoo;

pub use telegram::TelegramNotifier;
pub use yahoo::YahooFinanceSource;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SymbolData;

/// Price-data capability. Any failure is treated uniformly by the loop as
/// "no data for this symbol this cycle".
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<SymbolData>;
}

/// Notification capability. Failures are logged and never block the cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
