//! Shared type definitions.

pub mod analysis;
pub mod bar;

pub use analysis::{
    CycleReport, EvaluationResult, IndicatorSet, MacdOutput, Opportunity, OpportunityTier,
    Performance, SupportResistance, SymbolEvaluation,
};
pub use bar::{PriceBar, PriceSeries, SymbolData};
