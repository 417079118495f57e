use std::env;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigil::config::Config;
use vigil::error::AppError;
use vigil::services::{report, Monitor};
use vigil::sources::{Notifier, TelegramNotifier, YahooFinanceSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; missing required settings are the one fatal error.
    let config = match Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("fatal configuration error: {e}");
            notify_fatal_best_effort(&e).await;
            std::process::exit(1);
        }
    };

    info!(
        "starting vigil: {} symbols, {:?} schedule, {:?} session",
        config.watch_list.len(),
        config.schedule,
        config.market_hours
    );

    let source = Arc::new(YahooFinanceSource::new(&config.history_range)?);
    let notifier = Arc::new(TelegramNotifier::new(
        &config.telegram_bot_token,
        &config.telegram_chat_id,
    )?);

    // Ctrl-C interrupts any sleep and stops the loop without finishing
    // the in-flight cycle.
    let (shutdown_tx, _) = broadcast::channel(1);
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, shutting down");
                let _ = shutdown_tx.send(());
            }
        });
    }

    let monitor = Monitor::new(config, source, notifier, shutdown_tx);
    monitor.run().await;

    info!("vigil stopped");
    Ok(())
}

/// Try to deliver a diagnostic before exiting on a configuration error.
/// Only possible when the Telegram settings themselves are usable.
async fn notify_fatal_best_effort(error: &AppError) {
    let (Ok(token), Ok(chat_id)) = (
        env::var("TELEGRAM_BOT_TOKEN"),
        env::var("TELEGRAM_CHAT_ID"),
    ) else {
        return;
    };

    if let Ok(notifier) = TelegramNotifier::new(&token, &chat_id) {
        let message = report::format_fatal_alert(&error.to_string(), Utc::now());
        if let Err(e) = notifier.send(&message).await {
            warn!("could not deliver fatal diagnostic: {e}");
        }
    }
}
