//! Data model: historical market data, requests, and result types

mod market;
mod plans;
mod reports;
mod requests;
mod results;

pub use market::{HistoricalSeries, MAX_YEAR, MIN_YEAR, MarketYear, SeriesStatistics};
pub use plans::{ConversionYear, PenaltyProfile, RothLadderPlan, WithdrawalPlan};
pub use reports::{
    AllocationAnalysis, AllocationAnalysisOutcome, AllocationRole, AllocationStrategy,
    CalculationResult, GapAnalysis, ProfileGap, ProfileRoadmap, ReverseCalculationResult,
    RiskProfileScenario, SavingsRoadmap,
};
pub use requests::{ReverseRequest, RiskProfile, StandardRequest};
pub use results::{AggregateStatistics, SimulationInput, SimulationOutcome};
