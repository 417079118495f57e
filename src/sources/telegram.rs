//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

use super::Notifier;

/// Short timeout: alerting is best-effort and must never stall a cycle.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram Bot API notifier, HTML parse mode with a plain-text retry.
pub struct TelegramNotifier {
    client: Client,
    url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| AppError::Notification(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("https://api.telegram.org/bot{}/sendMessage", bot_token),
            chat_id: chat_id.to_string(),
        })
    }

    async fn post(&self, text: &str, parse_mode: Option<&str>) -> Result<()> {
        let mut payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        if let Some(mode) = parse_mode {
            payload["parse_mode"] = json!(mode);
        }

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Notification(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Notification(format!(
                "telegram status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        match self.post(text, Some("HTML")).await {
            Ok(()) => {
                debug!("telegram message delivered");
                Ok(())
            }
            // Telegram rejects messages with malformed entities outright;
            // retry once without markup so the alert still lands.
            Err(e) => {
                warn!("HTML send failed ({e}), retrying as plain text");
                self.post(text, None).await
            }
        }
    }
}
