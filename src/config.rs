use std::env;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{AppError, Result};
use crate::services::market_clock::SessionVariant;
use crate::services::monitor::SchedulePolicy;

/// Default watch-list when WATCH_LIST is not set: large liquid US names
/// plus the two index ETFs.
const DEFAULT_WATCH_LIST: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "NFLX", "AMD", "INTC", "SPY", "QQQ",
];

/// Application configuration.
///
/// Built once from the environment at startup and shared immutably;
/// the indicator and classifier code never sees it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (required).
    pub telegram_bot_token: String,
    /// Telegram chat ID to deliver alerts to (required).
    pub telegram_chat_id: String,
    /// Ordered watch-list of ticker symbols.
    pub watch_list: Vec<String>,
    /// RSI threshold below which the per-symbol oversold alert fires.
    pub rsi_threshold: f64,
    /// Pause between evaluation cycles while the market is open.
    pub eval_interval: Duration,
    /// Delay between consecutive symbol fetches (external rate limits).
    pub symbol_delay: Duration,
    /// Wait after an unexpected loop error before retrying.
    pub error_backoff: Duration,
    /// Trading session window variant.
    pub market_hours: SessionVariant,
    /// Exchange time zone.
    pub market_timezone: Tz,
    /// Minimum market capitalization in dollars; 0 disables the filter.
    pub min_market_cap: f64,
    /// Yahoo-style history range fetched per symbol ("3mo", "6mo", ...).
    pub history_range: String,
    /// Maximum number of opportunities per alert message.
    pub max_alerts: usize,
    /// Single pass (cron-driven) or continuous loop.
    pub schedule: SchedulePolicy,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails with `AppError::Config` when a required variable is missing
    /// or unparseable; this is the only fatal error in the process.
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| AppError::Config("TELEGRAM_BOT_TOKEN is not set".into()))?;
        let telegram_chat_id = env::var("TELEGRAM_CHAT_ID")
            .map_err(|_| AppError::Config("TELEGRAM_CHAT_ID is not set".into()))?;

        let watch_list = env::var("WATCH_LIST")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect());

        let market_timezone: Tz = match env::var("MARKET_TIMEZONE") {
            Ok(name) => name
                .parse()
                .map_err(|_| AppError::Config(format!("unknown time zone: {}", name)))?,
            Err(_) => chrono_tz::America::New_York,
        };

        let schedule = match env::var("RUN_MODE").as_deref() {
            Ok("once") => SchedulePolicy::Once,
            _ => SchedulePolicy::Continuous,
        };

        // Single-pass runs come from coarse external schedulers, so they
        // default to the wider session window.
        let market_hours = match env::var("MARKET_HOURS").as_deref() {
            Ok("extended") => SessionVariant::Extended,
            Ok("strict") => SessionVariant::Strict,
            _ if schedule == SchedulePolicy::Once => SessionVariant::Extended,
            _ => SessionVariant::Strict,
        };

        Ok(Self {
            telegram_bot_token,
            telegram_chat_id,
            watch_list,
            rsi_threshold: env_parse("RSI_THRESHOLD", 30.0),
            eval_interval: Duration::from_secs(env_parse("EVAL_INTERVAL_SECS", 1800)),
            symbol_delay: Duration::from_secs(env_parse("SYMBOL_DELAY_SECS", 2)),
            error_backoff: Duration::from_secs(env_parse("ERROR_BACKOFF_SECS", 300)),
            market_hours,
            market_timezone,
            min_market_cap: env_parse("MIN_MARKET_CAP", 10_000_000_000.0),
            history_range: env::var("HISTORY_RANGE").unwrap_or_else(|_| "6mo".to_string()),
            max_alerts: env_parse("MAX_ALERTS", 5),
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            telegram_bot_token: "token".to_string(),
            telegram_chat_id: "chat".to_string(),
            watch_list: DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect(),
            rsi_threshold: 30.0,
            eval_interval: Duration::from_secs(1800),
            symbol_delay: Duration::from_secs(2),
            error_backoff: Duration::from_secs(300),
            market_hours: SessionVariant::Strict,
            market_timezone: chrono_tz::America::New_York,
            min_market_cap: 10_000_000_000.0,
            history_range: "6mo".to_string(),
            max_alerts: 5,
            schedule: SchedulePolicy::Continuous,
        }
    }

    #[test]
    fn test_default_watch_list_is_ordered() {
        let config = base_config();
        assert_eq!(config.watch_list[0], "AAPL");
        assert_eq!(config.watch_list.len(), 12);
        assert!(config.watch_list.contains(&"SPY".to_string()));
    }

    #[test]
    fn test_config_clone_keeps_policies() {
        let config = base_config();
        let cloned = config.clone();
        assert_eq!(cloned.market_hours, SessionVariant::Strict);
        assert_eq!(cloned.schedule, SchedulePolicy::Continuous);
        assert_eq!(cloned.eval_interval, Duration::from_secs(1800));
    }
}
