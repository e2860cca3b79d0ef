//! Entry points over a loaded historical series
//!
//! A [`Planner`] owns the shared, read-only series together with the
//! assumptions every calculation reads. Each entry point validates its
//! request before any simulation runs.

use std::sync::Arc;

use crate::analysis::{AllocationInputs, analyze_allocations};
use crate::config::Assumptions;
use crate::error::{PlannerError, Result};
use crate::model::{
    AllocationAnalysisOutcome, CalculationResult, HistoricalSeries, ReverseCalculationResult,
    ReverseRequest, StandardRequest,
};
use crate::optimization::solve_withdrawal_rate;
use crate::progress::SweepProgress;
use crate::reverse::reverse_calculate;
use crate::simulation::success_rate;
use crate::taxes::{TaxSchedule, to_money};
use crate::withdrawal::plan_withdrawal;

#[derive(Debug, Clone)]
pub struct Planner {
    series: Arc<HistoricalSeries>,
    assumptions: Assumptions,
}

impl Planner {
    #[must_use]
    pub fn new(series: Arc<HistoricalSeries>) -> Self {
        Self::with_assumptions(series, Assumptions::default())
    }

    #[must_use]
    pub fn with_assumptions(series: Arc<HistoricalSeries>, assumptions: Assumptions) -> Self {
        Self {
            series,
            assumptions,
        }
    }

    #[must_use]
    pub fn series(&self) -> &HistoricalSeries {
        &self.series
    }

    #[must_use]
    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    fn duration_for(&self, retirement_age: u32) -> Result<u32> {
        self.assumptions
            .retirement_duration(retirement_age)
            .ok_or(PlannerError::InvalidDuration {
                retirement_age,
                life_expectancy: self.assumptions.life_expectancy,
            })
    }

    /// Highest sustainable withdrawal rate at the default allocation, with the
    /// tax-optimized split of the first year's withdrawal.
    pub fn calculate(
        &self,
        request: &StandardRequest,
        progress: &SweepProgress,
    ) -> Result<CalculationResult> {
        request.validate()?;
        let duration_years = self.duration_for(request.retirement_age)?;
        let stock_allocation = self.assumptions.default_stock_allocation;
        let total_balance = request.total_balance();
        let target_pct = request.success_rate_threshold * 100.0;

        let rate = solve_withdrawal_rate(
            &self.series,
            total_balance,
            duration_years,
            target_pct,
            stock_allocation,
            &self.assumptions.rate_search,
            progress,
        )?
        .rate;
        let achieved_success_rate = success_rate(
            &self.series,
            total_balance,
            rate,
            duration_years,
            stock_allocation,
            progress,
        )?;

        let gross = to_money(total_balance * rate);
        let plan = plan_withdrawal(
            &TaxSchedule::SINGLE_2025,
            gross,
            to_money(request.taxable_account_balance),
            to_money(request.retirement_account_balance),
        );

        tracing::info!(
            rate,
            achieved_success_rate,
            duration_years,
            "standard calculation complete"
        );

        Ok(CalculationResult {
            withdrawal_rate_pct: rate * 100.0,
            annual_gross_withdrawal: gross,
            estimated_annual_taxes: plan.total_tax(),
            net_annual_income: plan.net_income(),
            achieved_success_rate,
            scenarios_simulated: self.series.scenario_count(duration_years),
            years_in_retirement: duration_years,
            withdrawal_plan: plan,
        })
    }

    /// Sweep the candidate allocations for this request
    pub fn analyze_allocations(
        &self,
        request: &StandardRequest,
        progress: &SweepProgress,
    ) -> Result<AllocationAnalysisOutcome> {
        request.validate()?;
        let inputs = AllocationInputs {
            taxable_balance: request.taxable_account_balance,
            tax_deferred_balance: request.retirement_account_balance,
            duration_years: self.duration_for(request.retirement_age)?,
            target_success_pct: request.success_rate_threshold * 100.0,
        };
        analyze_allocations(&self.series, &inputs, &self.assumptions, progress)
    }

    /// Required portfolio per risk profile
    pub fn reverse(
        &self,
        request: &ReverseRequest,
        progress: &SweepProgress,
    ) -> Result<ReverseCalculationResult> {
        reverse_calculate(&self.series, request, &self.assumptions, progress)
    }
}
