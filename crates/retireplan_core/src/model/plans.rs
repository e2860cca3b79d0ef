//! Withdrawal, penalty, and Roth conversion plans

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How one year's gross withdrawal is sourced and taxed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalPlan {
    pub gross_annual_withdrawal: Decimal,
    /// Drawn from the taxable account, taxed as long-term gains
    pub taxable_source_amount: Decimal,
    /// Drawn from the tax-deferred account, taxed as ordinary income
    pub tax_deferred_source_amount: Decimal,
    pub ordinary_income_tax: Decimal,
    pub capital_gains_tax: Decimal,
    /// Total tax as a percentage of the gross withdrawal
    pub effective_tax_rate_pct: Decimal,
}

impl WithdrawalPlan {
    #[must_use]
    pub fn total_tax(&self) -> Decimal {
        self.ordinary_income_tax + self.capital_gains_tax
    }

    #[must_use]
    pub fn net_income(&self) -> Decimal {
        self.gross_annual_withdrawal - self.total_tax()
    }
}

/// Early-withdrawal penalties accrued before the penalty-free age
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyProfile {
    pub total_penalty: Decimal,
    pub years_with_penalty: u32,
    /// `total_penalty / years_with_penalty`, zero when no year is penalized
    pub per_year_penalty: Decimal,
    /// Empty when retirement starts at or after the penalty-free age
    pub warning: String,
    pub explanation: String,
}

/// One year of a Roth conversion ladder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionYear {
    /// Years since retirement, starting at 0
    pub year: u32,
    pub age: u32,
    pub conversion_amount: Decimal,
    pub conversion_tax: Decimal,
    /// Seasoned principal from the conversion five years earlier
    pub available_for_withdrawal: Decimal,
    pub note: String,
}

/// Cost comparison of a conversion ladder against paying the penalty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RothLadderPlan {
    pub is_recommended: bool,
    pub total_conversion_tax_cost: Decimal,
    /// Penalties plus ordinary tax over the penalty years
    pub total_penalty_cost: Decimal,
    /// Penalty cost minus conversion cost
    pub estimated_savings: Decimal,
    pub requires_immediate_funds: bool,
    pub year_by_year_schedule: Vec<ConversionYear>,
    pub strategy_explanation: String,
    pub transition_warning: String,
}
