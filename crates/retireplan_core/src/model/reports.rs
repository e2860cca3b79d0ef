//! Report types returned by the planner entry points

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::plans::{PenaltyProfile, RothLadderPlan, WithdrawalPlan};
use super::requests::RiskProfile;
use super::results::AggregateStatistics;

/// Result of the standard withdrawal-rate calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Highest rate meeting the target, in percent
    pub withdrawal_rate_pct: f64,
    pub annual_gross_withdrawal: Decimal,
    pub estimated_annual_taxes: Decimal,
    pub net_annual_income: Decimal,
    /// Success rate at the solved rate, 0-100
    pub achieved_success_rate: f64,
    pub scenarios_simulated: usize,
    pub years_in_retirement: u32,
    pub withdrawal_plan: WithdrawalPlan,
}

/// Which named strategy a candidate allocation was picked as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationRole {
    Conservative,
    Balanced,
    Aggressive,
}

impl AllocationRole {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            AllocationRole::Conservative => {
                "Prioritizes portfolio survival with highest success rate and lowest volatility. \
                 Best for those who prioritize security over growth."
            }
            AllocationRole::Balanced => {
                "Optimal risk/reward ratio based on historical performance. \
                 Balances growth potential with portfolio stability."
            }
            AllocationRole::Aggressive => {
                "Maximizes growth potential while maintaining acceptable success rate. \
                 Best for those comfortable with higher volatility for potentially greater returns."
            }
        }
    }
}

/// One evaluated stock/bond mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStrategy {
    /// Set only on the three selected strategies
    pub role: Option<AllocationRole>,
    pub stock_pct: u32,
    pub bond_pct: u32,
    pub statistics: AggregateStatistics,
    /// Solved withdrawal rate, in percent
    pub recommended_withdrawal_rate: f64,
    pub expected_annual_withdrawal: Decimal,
    pub expected_net_income: Decimal,
    pub withdrawal_plan: WithdrawalPlan,
    pub score: f64,
    pub description: String,
}

impl AllocationStrategy {
    /// Copy of this candidate labelled with a role
    #[must_use]
    pub fn with_role(&self, role: AllocationRole) -> Self {
        Self {
            role: Some(role),
            description: role.description().to_string(),
            ..self.clone()
        }
    }
}

/// The three named picks plus every scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationAnalysis {
    pub conservative: AllocationStrategy,
    pub balanced: AllocationStrategy,
    pub aggressive: AllocationStrategy,
    /// Surviving candidates, best score first
    pub ranked: Vec<AllocationStrategy>,
    pub retirement_duration: u32,
    /// Target success rate in percent
    pub target_success_rate: f64,
    pub total_portfolio_balance: Decimal,
    pub allocations_analyzed: usize,
    pub methodology: String,
}

/// Allocation analysis, or the reason no candidate survived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllocationAnalysisOutcome {
    Complete(Box<AllocationAnalysis>),
    Insufficient { reason: String },
}

/// Required portfolio and income detail for one risk profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfileScenario {
    pub risk_profile: RiskProfile,
    pub required_portfolio_size: Decimal,
    /// In percent
    pub withdrawal_rate_pct: f64,
    pub annual_pre_tax_withdrawal: Decimal,
    pub annual_after_tax_income: Decimal,
    pub estimated_annual_taxes: Decimal,
    pub effective_tax_rate_pct: Decimal,
    /// 0-100
    pub historical_success_rate: f64,
    pub stock_allocation_pct: u32,
    pub bond_allocation_pct: u32,
    pub median_final_value: Decimal,
    pub worst_case_final_value: Decimal,
    pub best_case_final_value: Decimal,
    /// Present when retiring before 59
    pub penalty: Option<PenaltyProfile>,
    pub roth_ladder: Option<RothLadderPlan>,
    pub recommendation: String,
}

/// Funding gap for one profile; negative means over-funded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileGap {
    pub risk_profile: RiskProfile,
    pub required: Decimal,
    pub gap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRoadmap {
    pub risk_profile: RiskProfile,
    /// Linear years of saving to close a positive gap
    pub years_to_goal: Option<u32>,
    /// Monthly saving that closes the gap by the retirement age
    pub required_monthly_savings: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRoadmap {
    pub annual_savings: Decimal,
    pub years_until_retirement: u32,
    pub per_profile: Vec<ProfileRoadmap>,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub current_total_savings: Decimal,
    pub per_profile: Vec<ProfileGap>,
    pub savings_roadmap: Option<SavingsRoadmap>,
}

impl GapAnalysis {
    #[must_use]
    pub fn gap_for(&self, profile: RiskProfile) -> Option<&ProfileGap> {
        self.per_profile.iter().find(|g| g.risk_profile == profile)
    }
}

/// Result of the reverse calculation; `scenarios` is empty when nothing could be solved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseCalculationResult {
    pub scenarios: Vec<RiskProfileScenario>,
    pub gap_analysis: Option<GapAnalysis>,
    pub summary: String,
}

impl ReverseCalculationResult {
    #[must_use]
    pub fn scenario_for(&self, profile: RiskProfile) -> Option<&RiskProfileScenario> {
        self.scenarios.iter().find(|s| s.risk_profile == profile)
    }
}
