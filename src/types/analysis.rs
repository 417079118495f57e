//! Derived, cycle-scoped analysis snapshots.
//!
//! Everything here is computed fresh each evaluation cycle, never mutated,
//! and discarded after the cycle report goes out.

/// MACD snapshot at the latest bar.
#[derive(Debug, Clone, Copy)]
pub struct MacdOutput {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    /// Instantaneous `line > signal` at the latest bar, not an edge detector.
    pub bullish_crossover: bool,
}

/// Support/resistance distances over the trailing lookback window.
#[derive(Debug, Clone, Copy)]
pub struct SupportResistance {
    pub recent_high: f64,
    pub recent_low: f64,
    /// Percent distance of the latest close from the recent high (<= 0 near highs).
    pub pct_from_high: f64,
    /// Percent distance of the latest close from the recent low (>= 0 above lows).
    pub pct_from_low: f64,
    /// Within 5% above the recent low.
    pub near_support: bool,
}

/// Trailing performance over named lookbacks.
#[derive(Debug, Clone, Copy)]
pub struct Performance {
    pub pct_1m: f64,
    pub pct_3m: f64,
}

/// Read-only indicator snapshot for one symbol in one cycle.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd: MacdOutput,
    pub support_resistance: SupportResistance,
    pub volatility_annualized_pct: f64,
    pub performance: Performance,
    pub volume_ratio: f64,
}

/// Discrete opportunity classification derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpportunityTier {
    None,
    Moderate,
    Good,
    Excellent,
}

impl OpportunityTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => OpportunityTier::None,
            1..=2 => OpportunityTier::Moderate,
            3..=4 => OpportunityTier::Good,
            _ => OpportunityTier::Excellent,
        }
    }

    /// Emoji-tagged label used in alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            OpportunityTier::None => "NONE",
            OpportunityTier::Moderate => "🔵 MODERATE",
            OpportunityTier::Good => "🟡 GOOD",
            OpportunityTier::Excellent => "🟢 EXCELLENT",
        }
    }
}

/// A scored opportunity for one symbol. Lifecycle is a single cycle.
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub symbol: String,
    pub score: u32,
    pub tier: OpportunityTier,
    /// Reasons in classifier evaluation order (RSI, MACD, performance, support).
    pub reasons: Vec<String>,
}

/// Outcome of evaluating one symbol.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub symbol: String,
    pub outcome: Result<SymbolEvaluation, String>,
}

impl EvaluationResult {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Successful evaluation payload for one symbol.
#[derive(Debug, Clone)]
pub struct SymbolEvaluation {
    pub indicators: IndicatorSet,
    pub last_close: f64,
    pub company_name: Option<String>,
    /// None when the symbol produced no opportunity (score 0) or was
    /// excluded by the market-cap floor.
    pub opportunity: Option<Opportunity>,
}

/// Aggregate of one full watch-list pass.
#[derive(Debug)]
pub struct CycleReport {
    pub results: Vec<EvaluationResult>,
}

impl CycleReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    pub fn opportunities_found(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .filter(|e| e.opportunity.is_some())
            .count()
    }

    /// Discovered opportunities ranked by score descending.
    ///
    /// The sort is stable, so equal scores keep watch-list order.
    pub fn ranked_opportunities(&self) -> Vec<(&SymbolEvaluation, &Opportunity)> {
        let mut ranked: Vec<_> = self
            .results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .filter_map(|e| e.opportunity.as_ref().map(|o| (e, o)))
            .collect();
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        ranked
    }
}
