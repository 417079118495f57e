//! Opportunity classifier.
//!
//! Maps one indicator snapshot to a composite score and tier. Checks run
//! in a fixed order (RSI, MACD, 3M performance, support) and each group
//! contributes at most one band, so scores never double-count.

use crate::types::{IndicatorSet, Opportunity, OpportunityTier};

/// Score an indicator snapshot; `None` when nothing lines up (score 0).
pub fn classify(symbol: &str, indicators: &IndicatorSet) -> Option<Opportunity> {
    let mut score: u32 = 0;
    let mut reasons = Vec::new();

    // RSI bands, lowest match wins.
    let rsi = indicators.rsi;
    if rsi < 25.0 {
        score += 3;
        reasons.push(format!("RSI extremely low ({:.1})", rsi));
    } else if rsi < 30.0 {
        score += 2;
        reasons.push(format!("RSI oversold ({:.1})", rsi));
    } else if rsi < 40.0 {
        score += 1;
        reasons.push(format!("RSI moderately low ({:.1})", rsi));
    }

    // MACD: a confirmed cross (positive histogram) outranks a turning one.
    let macd = &indicators.macd;
    if macd.bullish_crossover && macd.histogram > 0.0 {
        score += 2;
        reasons.push("MACD bullish cross confirmed".to_string());
    } else if macd.bullish_crossover {
        score += 1;
        reasons.push("MACD turning bullish".to_string());
    }

    // 3-month drawdown bands.
    let pct_3m = indicators.performance.pct_3m;
    if pct_3m < -20.0 {
        score += 2;
        reasons.push(format!("significant 3M drop ({:.1}%)", pct_3m));
    } else if pct_3m < -10.0 {
        score += 1;
        reasons.push(format!("moderate 3M correction ({:.1}%)", pct_3m));
    }

    if indicators.support_resistance.near_support {
        score += 1;
        reasons.push("near support level".to_string());
    }

    if score == 0 {
        return None;
    }

    Some(Opportunity {
        symbol: symbol.to_string(),
        score,
        tier: OpportunityTier::from_score(score),
        reasons,
    })
}
