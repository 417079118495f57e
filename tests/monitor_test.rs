//! Evaluation-cycle tests with mock price source and notifier.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use vigil::config::Config;
use vigil::error::{AppError, Result};
use vigil::services::{Monitor, SchedulePolicy, SessionVariant};
use vigil::sources::{Notifier, PriceSource};
use vigil::types::{PriceBar, SymbolData};

/// A linearly declining daily series; enough history for every indicator.
fn declining_series(bars: usize, start: f64, end: f64) -> Vec<PriceBar> {
    let step = (start - end) / (bars - 1) as f64;
    (0..bars)
        .map(|i| {
            let close = start - step * i as f64;
            PriceBar {
                timestamp: 1_700_000_000 + i as i64 * 86_400,
                open: close + step,
                high: close + step + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

/// Flat closes with a wide intraday range, so the close is never within
/// 5% of the window low and nothing scores.
fn flat_series(bars: usize, close: f64) -> Vec<PriceBar> {
    (0..bars)
        .map(|i| PriceBar {
            timestamp: 1_700_000_000 + i as i64 * 86_400,
            open: close,
            high: close + 10.0,
            low: close - 10.0,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

fn symbol_data(symbol: &str, series: Vec<PriceBar>, market_cap: Option<f64>) -> SymbolData {
    SymbolData {
        symbol: symbol.to_string(),
        series,
        company_name: Some(format!("{symbol} Corp")),
        market_cap,
    }
}

struct MockSource {
    data: HashMap<String, SymbolData>,
}

impl MockSource {
    fn new(entries: Vec<SymbolData>) -> Self {
        Self {
            data: entries
                .into_iter()
                .map(|d| (d.symbol.clone(), d))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceSource for MockSource {
    async fn fetch(&self, symbol: &str) -> Result<SymbolData> {
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| AppError::Fetch(format!("{symbol}: no data")))
    }
}

#[derive(Default)]
struct MockNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _text: &str) -> Result<()> {
        Err(AppError::Notification("telegram 502".to_string()))
    }
}

fn test_config(watch_list: &[&str]) -> Arc<Config> {
    Arc::new(Config {
        telegram_bot_token: "token".to_string(),
        telegram_chat_id: "chat".to_string(),
        watch_list: watch_list.iter().map(|s| s.to_string()).collect(),
        rsi_threshold: 30.0,
        eval_interval: Duration::from_secs(1800),
        symbol_delay: Duration::ZERO,
        error_backoff: Duration::from_secs(300),
        market_hours: SessionVariant::Strict,
        market_timezone: chrono_tz::America::New_York,
        min_market_cap: 10_000_000_000.0,
        history_range: "6mo".to_string(),
        max_alerts: 5,
        schedule: SchedulePolicy::Continuous,
    })
}

fn monitor_with(
    config: Arc<Config>,
    source: MockSource,
    notifier: Arc<dyn Notifier>,
) -> (Monitor, broadcast::Sender<()>) {
    let (shutdown_tx, _) = broadcast::channel(1);
    let monitor = Monitor::new(config, Arc::new(source), notifier, shutdown_tx.clone());
    (monitor, shutdown_tx)
}

#[tokio::test(start_paused = true)]
async fn per_symbol_failure_does_not_abort_cycle() {
    let config = test_config(&["A", "B", "C", "D", "E"]);
    // "C" has no data; everything else is a quiet flat series.
    let source = MockSource::new(vec![
        symbol_data("A", flat_series(70, 100.0), None),
        symbol_data("B", flat_series(70, 100.0), None),
        symbol_data("D", flat_series(70, 100.0), None),
        symbol_data("E", flat_series(70, 100.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    assert_eq!(report.total(), 5);
    assert_eq!(report.successful(), 4);
    assert_eq!(report.opportunities_found(), 0);
    // Nothing scored, so nothing was sent.
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn declining_symbol_triggers_ranked_alert() {
    let config = test_config(&["DEEP", "FLAT"]);
    // A -23% three-month slide with no up days: RSI 0 (+3), significant
    // 3M drop (+2), near support (+1) = score 6, Excellent.
    let source = MockSource::new(vec![
        symbol_data("DEEP", declining_series(70, 200.0, 150.0), None),
        symbol_data("FLAT", flat_series(70, 100.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    assert_eq!(report.opportunities_found(), 1);
    let ranked = report.ranked_opportunities();
    assert_eq!(ranked[0].1.symbol, "DEEP");
    assert_eq!(ranked[0].1.score, 6);
    assert_eq!(
        ranked[0].1.reasons,
        vec![
            "RSI extremely low (0.0)",
            "significant 3M drop (-23.3%)",
            "near support level",
        ]
    );

    // An immediate oversold alert for DEEP, then the ranked summary.
    // No run summary in continuous mode.
    let messages = notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("RSI ALERT - OVERSOLD"));
    assert!(messages[0].contains("DEEP"));
    let message = &messages[1];
    assert!(message.contains("ACCUMULATION OPPORTUNITIES"));
    assert!(message.contains("1. DEEP"));
    assert!(message.contains("🟢 EXCELLENT"));
    // Condensed form carries only the first two reasons.
    assert!(message.contains("RSI extremely low (0.0), significant 3M drop (-23.3%)"));
    assert!(!message.contains("near support level"));
}

#[tokio::test(start_paused = true)]
async fn equal_scores_keep_watch_list_order() {
    let config = test_config(&["DEEP1", "DEEP2"]);
    let source = MockSource::new(vec![
        symbol_data("DEEP1", declining_series(70, 200.0, 150.0), None),
        symbol_data("DEEP2", declining_series(70, 200.0, 150.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    let ranked = report.ranked_opportunities();
    assert_eq!(ranked[0].1.symbol, "DEEP1");
    assert_eq!(ranked[1].1.symbol, "DEEP2");
    assert_eq!(ranked[0].1.score, ranked[1].1.score);

    let messages = notifier.messages.lock().unwrap();
    let message = messages.last().unwrap();
    let pos1 = message.find("1. DEEP1").expect("DEEP1 first");
    let pos2 = message.find("2. DEEP2").expect("DEEP2 second");
    assert!(pos1 < pos2);
}

#[tokio::test(start_paused = true)]
async fn market_cap_floor_excludes_before_scoring() {
    let config = test_config(&["SMALL", "BIG", "UNKNOWN"]);
    let deep = || declining_series(70, 200.0, 150.0);
    let source = MockSource::new(vec![
        symbol_data("SMALL", deep(), Some(5_000_000_000.0)),
        symbol_data("BIG", deep(), Some(50_000_000_000.0)),
        // No reported cap passes the filter.
        symbol_data("UNKNOWN", deep(), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    assert_eq!(report.successful(), 3);
    assert_eq!(report.opportunities_found(), 2);
    let symbols: Vec<_> = report
        .ranked_opportunities()
        .iter()
        .map(|(_, o)| o.symbol.clone())
        .collect();
    assert_eq!(symbols, vec!["BIG", "UNKNOWN"]);

    // The cap floor gates scoring only; the oversold alert still fires.
    let messages = notifier.messages.lock().unwrap();
    assert!(messages
        .iter()
        .any(|m| m.contains("RSI ALERT - OVERSOLD") && m.contains("SMALL")));
}

#[tokio::test(start_paused = true)]
async fn oversold_alert_fires_beyond_ranking_cutoff() {
    let mut config = (*test_config(&["DEEP1", "DEEP2"])).clone();
    config.max_alerts = 1;
    let config = Arc::new(config);

    let source = MockSource::new(vec![
        symbol_data("DEEP1", declining_series(70, 200.0, 150.0), None),
        symbol_data("DEEP2", declining_series(70, 200.0, 150.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    let messages = notifier.messages.lock().unwrap();
    // DEEP2 misses the ranked cutoff but still gets its own oversold alert.
    let ranked = messages.last().unwrap();
    assert!(ranked.contains("1. DEEP1"));
    assert!(!ranked.contains("DEEP2"));
    assert!(messages
        .iter()
        .any(|m| m.contains("RSI ALERT - OVERSOLD") && m.contains("DEEP2")));
}

#[tokio::test(start_paused = true)]
async fn single_pass_run_sends_summary_after_alerts() {
    let mut config = (*test_config(&["DEEP", "FLAT"])).clone();
    config.schedule = SchedulePolicy::Once;
    let config = Arc::new(config);

    let source = MockSource::new(vec![
        symbol_data("DEEP", declining_series(70, 200.0, 150.0), None),
        symbol_data("FLAT", flat_series(70, 100.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    let messages = notifier.messages.lock().unwrap();
    let summary = messages.last().unwrap();
    assert!(summary.contains("Watch-list check summary"));
    assert!(summary.contains("Symbols checked:</b> 2/2"));
    assert!(summary.contains("Alerts sent:</b> 1"));
}

#[tokio::test(start_paused = true)]
async fn notification_failure_does_not_fail_cycle() {
    let config = test_config(&["DEEP"]);
    let source = MockSource::new(vec![symbol_data(
        "DEEP",
        declining_series(70, 200.0, 150.0),
        None,
    )]);
    let (monitor, shutdown_tx) = monitor_with(config, source, Arc::new(FailingNotifier));

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();
    assert_eq!(report.opportunities_found(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_cycle() {
    let mut config = (*test_config(&["A", "B", "C"])).clone();
    config.symbol_delay = Duration::from_secs(3600);
    let config = Arc::new(config);

    let source = MockSource::new(vec![
        symbol_data("A", flat_series(70, 100.0), None),
        symbol_data("B", flat_series(70, 100.0), None),
        symbol_data("C", flat_series(70, 100.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    // Signal shutdown before the cycle reaches its first inter-symbol
    // delay; the pending signal wins over the hour-long sleep.
    let mut rx = shutdown_tx.subscribe();
    shutdown_tx.send(()).unwrap();

    let outcome = monitor.run_cycle(&mut rx).await.unwrap();
    assert!(outcome.is_none(), "cycle should stop without a report");
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn insufficient_history_is_a_per_symbol_failure() {
    let config = test_config(&["SHORT", "OK"]);
    let source = MockSource::new(vec![
        symbol_data("SHORT", flat_series(30, 100.0), None),
        symbol_data("OK", flat_series(70, 100.0), None),
    ]);
    let notifier = Arc::new(MockNotifier::default());
    let (monitor, shutdown_tx) = monitor_with(config, source, notifier.clone());

    let mut rx = shutdown_tx.subscribe();
    let report = monitor.run_cycle(&mut rx).await.unwrap().unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.successful(), 1);
    let failed = report.results.iter().find(|r| r.symbol == "SHORT").unwrap();
    assert!(failed.outcome.as_ref().unwrap_err().contains("insufficient data"));
}
