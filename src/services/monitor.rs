//! Evaluation loop.
//!
//! Drives the run/wait cycle over the watch-list: market-hours gating,
//! per-symbol evaluation with failure isolation, ranked alerting, and
//! bounded backoff on systemic errors. The loop only terminates on the
//! shutdown signal.

use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::services::classifier::classify;
use crate::services::indicators::compute_indicator_set;
use crate::services::market_clock::MarketClock;
use crate::services::report;
use crate::sources::{Notifier, PriceSource};
use crate::types::{CycleReport, EvaluationResult, SymbolEvaluation};

/// Never sleep past the open by more than this while waiting.
const MAX_WAIT_FOR_OPEN: Duration = Duration::from_secs(3600);

/// Single pass (cron/CI driven) or steady-state service loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePolicy {
    Once,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    WaitingForOpen,
    Evaluating,
    SleepingBetweenCycles,
    ErrorBackoff,
}

/// Watch-list monitor.
pub struct Monitor {
    config: Arc<Config>,
    clock: MarketClock,
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Monitor {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let clock = MarketClock::new(config.market_timezone, config.market_hours);
        Self {
            config,
            clock,
            source,
            notifier,
            shutdown_tx,
        }
    }

    /// Run the loop until shutdown (or, under `SchedulePolicy::Once`,
    /// until one gate check and at most one cycle complete).
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut state = LoopState::WaitingForOpen;

        loop {
            state = match state {
                LoopState::WaitingForOpen => {
                    if self.clock.is_open(Utc::now()) {
                        LoopState::Evaluating
                    } else if self.config.schedule == SchedulePolicy::Once {
                        info!("market closed, single-pass run skipped");
                        return;
                    } else {
                        let now = Utc::now();
                        let next_open = self.clock.next_open(now);
                        let until_open = (next_open - now)
                            .to_std()
                            .unwrap_or(Duration::ZERO);
                        let wait = cmp::min(until_open, MAX_WAIT_FOR_OPEN);
                        info!(
                            "market closed, next open {} ({}s wait)",
                            next_open,
                            wait.as_secs()
                        );
                        if !self.sleep_or_shutdown(wait, &mut shutdown_rx).await {
                            return;
                        }
                        LoopState::WaitingForOpen
                    }
                }
                LoopState::Evaluating => match self.run_cycle(&mut shutdown_rx).await {
                    Ok(Some(_report)) => {
                        if self.config.schedule == SchedulePolicy::Once {
                            info!("single-pass run complete");
                            return;
                        }
                        LoopState::SleepingBetweenCycles
                    }
                    // Shutdown arrived mid-cycle.
                    Ok(None) => return,
                    Err(e) => {
                        error!("unexpected cycle error: {e}");
                        LoopState::ErrorBackoff
                    }
                },
                LoopState::SleepingBetweenCycles => {
                    if !self.clock.is_open(Utc::now()) {
                        LoopState::WaitingForOpen
                    } else {
                        debug!(
                            "sleeping {}s until next cycle",
                            self.config.eval_interval.as_secs()
                        );
                        if !self
                            .sleep_or_shutdown(self.config.eval_interval, &mut shutdown_rx)
                            .await
                        {
                            return;
                        }
                        LoopState::WaitingForOpen
                    }
                }
                LoopState::ErrorBackoff => {
                    warn!(
                        "backing off {}s before retrying",
                        self.config.error_backoff.as_secs()
                    );
                    if !self
                        .sleep_or_shutdown(self.config.error_backoff, &mut shutdown_rx)
                        .await
                    {
                        return;
                    }
                    LoopState::WaitingForOpen
                }
            };
        }
    }

    /// One full watch-list pass. `Ok(None)` means shutdown interrupted the
    /// cycle; per-symbol failures never surface as `Err`.
    pub async fn run_cycle(
        &self,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> Result<Option<CycleReport>> {
        info!(
            "evaluating {} symbols (RSI threshold {})",
            self.config.watch_list.len(),
            self.config.rsi_threshold
        );

        let mut results = Vec::with_capacity(self.config.watch_list.len());
        let mut alerts_sent = 0usize;
        for (i, symbol) in self.config.watch_list.iter().enumerate() {
            if i > 0
                && !self
                    .sleep_or_shutdown(self.config.symbol_delay, shutdown_rx)
                    .await
            {
                return Ok(None);
            }

            let outcome = self.evaluate_symbol(symbol).await;
            match &outcome {
                Ok(eval) if eval.indicators.rsi < self.config.rsi_threshold => {
                    warn!(
                        "{symbol}: RSI {:.1} below threshold {:.0} at ${:.2}",
                        eval.indicators.rsi, self.config.rsi_threshold, eval.last_close
                    );
                    if self.send_oversold_alert(symbol, eval).await {
                        alerts_sent += 1;
                    }
                }
                Ok(eval) => debug!("{symbol}: RSI {:.1} (ok)", eval.indicators.rsi),
                Err(e) if e.is_per_symbol() => warn!("{symbol}: evaluation failed: {e}"),
                Err(e) => error!("{symbol}: unexpected evaluation error: {e}"),
            }
            results.push(EvaluationResult {
                symbol: symbol.clone(),
                outcome: outcome.map_err(|e| e.to_string()),
            });
        }

        let report = CycleReport { results };
        info!(
            "cycle complete: {}/{} successful, {} opportunities",
            report.successful(),
            report.total(),
            report.opportunities_found()
        );

        let ranked = report.ranked_opportunities();
        if !ranked.is_empty() {
            let message =
                report::format_opportunity_alert(&ranked, self.config.max_alerts, Utc::now());
            if let Err(e) = self.notifier.send(&message).await {
                // Alerting is best-effort; evaluation continues regardless.
                error!("failed to send opportunity alert: {e}");
            }
        }

        // Single-pass runs report back to the channel that scheduled them,
        // but only when something actually fired.
        if self.config.schedule == SchedulePolicy::Once && alerts_sent > 0 {
            let summary = report::format_run_summary(
                report.total(),
                report.successful(),
                alerts_sent,
                Utc::now(),
            );
            if let Err(e) = self.notifier.send(&summary).await {
                error!("failed to send run summary: {e}");
            }
        }

        Ok(Some(report))
    }

    /// Immediate per-symbol oversold notification. Fires regardless of the
    /// composite score or ranking cutoff; returns whether delivery worked.
    async fn send_oversold_alert(&self, symbol: &str, eval: &SymbolEvaluation) -> bool {
        let message = report::format_oversold_alert(
            symbol,
            eval.company_name.as_deref(),
            eval.indicators.rsi,
            eval.last_close,
            self.config.rsi_threshold,
            Utc::now(),
        );
        match self.notifier.send(&message).await {
            Ok(()) => {
                info!("{symbol}: oversold alert sent");
                true
            }
            Err(e) => {
                error!("{symbol}: failed to send oversold alert: {e}");
                false
            }
        }
    }

    async fn evaluate_symbol(&self, symbol: &str) -> Result<SymbolEvaluation> {
        let data = self.source.fetch(symbol).await?;
        let indicators = compute_indicator_set(&data.series)?;
        // compute_indicator_set rejects empty series, so the close exists.
        let last_close = data.last_close().unwrap_or_default();

        let capped_out = self.config.min_market_cap > 0.0
            && data
                .market_cap
                .map(|cap| cap < self.config.min_market_cap)
                .unwrap_or(false);

        let opportunity = if capped_out {
            debug!("{symbol}: below market-cap floor, not scored");
            None
        } else {
            classify(symbol, &indicators)
        };

        Ok(SymbolEvaluation {
            indicators,
            last_close,
            company_name: data.company_name,
            opportunity,
        })
    }

    /// Interruptible sleep; returns false when shutdown was signaled.
    async fn sleep_or_shutdown(
        &self,
        duration: Duration,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> bool {
        tokio::select! {
            _ = sleep(duration) => true,
            _ = shutdown_rx.recv() => {
                info!("shutdown signal received");
                false
            }
        }
    }
}
