//! Alert message formatting.
//!
//! Telegram HTML markup. The transport degrades to plain text when markup
//! is rejected, so nothing here is load-bearing beyond readability.

use chrono::{DateTime, Utc};

use crate::types::{Opportunity, SymbolEvaluation};

/// Reasons surfaced per symbol in the condensed ranked list.
const CONDENSED_REASONS: usize = 2;

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let cut: String = name.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}

/// Ranked accumulation-opportunity summary, best first.
pub fn format_opportunity_alert(
    ranked: &[(&SymbolEvaluation, &Opportunity)],
    max_entries: usize,
    now: DateTime<Utc>,
) -> String {
    let mut message = String::from("💎 <b>ACCUMULATION OPPORTUNITIES</b>\n\n");

    for (i, (eval, opp)) in ranked.iter().take(max_entries).enumerate() {
        message.push_str(&format!("<b>{}. {}</b> - {}\n", i + 1, opp.symbol, opp.tier.label()));
        if let Some(name) = &eval.company_name {
            message.push_str(&format!("🏢 {}\n", truncate(name, 30)));
        }
        message.push_str(&format!(
            "💰 ${:.2} | 📊 RSI: {:.1}\n",
            eval.last_close, eval.indicators.rsi
        ));
        message.push_str(&format!(
            "📈 3M: {:.1}% | 🎯 Score: {}\n",
            eval.indicators.performance.pct_3m, opp.score
        ));
        let condensed: Vec<&str> = opp
            .reasons
            .iter()
            .take(CONDENSED_REASONS)
            .map(|r| r.as_str())
            .collect();
        message.push_str(&format!("🔍 {}\n\n", condensed.join(", ")));
    }

    message.push_str(&format!("⏰ {}\n", now.format("%d/%m/%Y %H:%M")));
    message.push_str("🤖 <i>Automated analysis - not financial advice</i>");
    message
}

/// Per-symbol oversold alert, sent as soon as a symbol's RSI drops below
/// the configured threshold, independent of composite scoring or ranking.
pub fn format_oversold_alert(
    symbol: &str,
    company_name: Option<&str>,
    rsi: f64,
    last_close: f64,
    threshold: f64,
    now: DateTime<Utc>,
) -> String {
    let mut message = String::from("🚨 <b>RSI ALERT - OVERSOLD</b> 🚨\n\n");
    message.push_str(&format!("📊 <b>Symbol:</b> {}\n", symbol));
    if let Some(name) = company_name {
        message.push_str(&format!("🏢 {}\n", truncate(name, 30)));
    }
    message.push_str(&format!("📈 <b>RSI (14):</b> {:.2}\n", rsi));
    message.push_str(&format!("💰 <b>Price:</b> ${:.2}\n", last_close));
    message.push_str(&format!("⏰ <b>Date:</b> {}\n\n", now.format("%d/%m/%Y %H:%M:%S")));
    message.push_str(&format!(
        "⚠️ RSI below {:.0} - possible oversold condition\n",
        threshold
    ));
    message.push_str("🤖 <i>Automated analysis - not financial advice</i>");
    message
}

/// Pass summary for single-shot runs that raised at least one alert.
pub fn format_run_summary(
    total: usize,
    successful: usize,
    alerts_sent: usize,
    now: DateTime<Utc>,
) -> String {
    format!(
        "📊 <b>Watch-list check summary</b>\n\n\
         ✅ <b>Symbols checked:</b> {}/{}\n\
         🚨 <b>Alerts sent:</b> {}\n\
         ⏰ <b>Time:</b> {}\n\n\
         🤖 <i>Automated analysis - not financial advice</i>",
        successful,
        total,
        alerts_sent,
        now.format("%d/%m/%Y %H:%M:%S")
    )
}

/// Best-effort diagnostic sent before exiting on an unrecoverable error.
pub fn format_fatal_alert(error: &str, now: DateTime<Utc>) -> String {
    format!(
        "❌ <b>Monitor error</b>\n\n🐛 <b>Error:</b> {}\n⏰ <b>Date:</b> {}",
        error,
        now.format("%d/%m/%Y %H:%M:%S")
    )
}
