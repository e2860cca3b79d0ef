//! Allocation sweep with parallel evaluation
//!
//! Every candidate stock share is solved for its sustainable withdrawal rate,
//! backtested at that rate, taxed with the optimized split, and scored.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::Assumptions;
use crate::error::{PlannerError, Result};
use crate::model::{
    AllocationAnalysis, AllocationAnalysisOutcome, AllocationRole, AllocationStrategy,
    HistoricalSeries,
};
use crate::optimization::solve_withdrawal_rate;
use crate::progress::SweepProgress;
use crate::simulation::aggregate_over_all_windows;
use crate::taxes::{TaxSchedule, to_money};
use crate::withdrawal::plan_withdrawal;

use super::selection::{score, select_aggressive, select_balanced, select_conservative};

/// Account balances and goal shared by every candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationInputs {
    pub taxable_balance: f64,
    pub tax_deferred_balance: f64,
    pub duration_years: u32,
    /// Target success rate in percent
    pub target_success_pct: f64,
}

impl AllocationInputs {
    #[must_use]
    pub fn total_balance(&self) -> f64 {
        self.taxable_balance + self.tax_deferred_balance
    }
}

/// Evaluate one stock share. `Ok(None)` means no window survived at the
/// solved rate and the candidate should be dropped.
pub fn evaluate_candidate(
    series: &HistoricalSeries,
    stock_allocation: f64,
    inputs: &AllocationInputs,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<Option<AllocationStrategy>> {
    let total_balance = inputs.total_balance();
    let rate = solve_withdrawal_rate(
        series,
        total_balance,
        inputs.duration_years,
        inputs.target_success_pct,
        stock_allocation,
        &assumptions.rate_search,
        progress,
    )?
    .rate;

    let statistics = aggregate_over_all_windows(
        series,
        total_balance,
        rate,
        inputs.duration_years,
        stock_allocation,
        progress,
    )?;
    if !statistics.has_successes() {
        tracing::debug!(stock_allocation, rate, "allocation has no surviving windows");
        return Ok(None);
    }
    if !statistics.median_final_value.is_finite() || !statistics.volatility.is_finite() {
        return Err(PlannerError::Computation(format!(
            "non-finite statistics for {:.0}% stocks",
            stock_allocation * 100.0
        )));
    }

    let gross = to_money(total_balance * rate);
    let plan = plan_withdrawal(
        &TaxSchedule::SINGLE_2025,
        gross,
        to_money(inputs.taxable_balance),
        to_money(inputs.tax_deferred_balance),
    );
    let stock_pct = (stock_allocation * 100.0).round() as u32;

    Ok(Some(AllocationStrategy {
        role: None,
        stock_pct,
        bond_pct: 100u32.saturating_sub(stock_pct),
        score: score(
            statistics.success_rate,
            statistics.median_final_value,
            statistics.volatility,
            total_balance,
        ),
        statistics,
        recommended_withdrawal_rate: rate * 100.0,
        expected_annual_withdrawal: gross,
        expected_net_income: plan.net_income(),
        withdrawal_plan: plan,
        description: String::new(),
    }))
}

fn methodology(series: &HistoricalSeries) -> String {
    let (min_year, max_year) = series.year_range();
    format!(
        "Historical rolling period analysis using data from {min_year}-{max_year}. \
         Each allocation is tested against all historical retirement periods of the specified duration. \
         Success is defined as maintaining a positive portfolio balance throughout retirement."
    )
}

/// Sweep every candidate allocation and pick the three named strategies.
///
/// A candidate that fails to compute is logged and left out; cancellation
/// aborts the whole sweep.
pub fn analyze_allocations(
    series: &HistoricalSeries,
    inputs: &AllocationInputs,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<AllocationAnalysisOutcome> {
    let candidates = &assumptions.allocation_candidates;
    tracing::info!(
        candidates = candidates.len(),
        duration_years = inputs.duration_years,
        target = inputs.target_success_pct,
        "analyzing allocations"
    );

    #[cfg(feature = "parallel")]
    let evaluated: Vec<(f64, Result<Option<AllocationStrategy>>)> = candidates
        .par_iter()
        .map(|&stock| {
            (
                stock,
                evaluate_candidate(series, stock, inputs, assumptions, progress),
            )
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let evaluated: Vec<(f64, Result<Option<AllocationStrategy>>)> = candidates
        .iter()
        .map(|&stock| {
            (
                stock,
                evaluate_candidate(series, stock, inputs, assumptions, progress),
            )
        })
        .collect();

    let mut ranked = Vec::with_capacity(evaluated.len());
    for (stock, result) in evaluated {
        match result {
            Ok(Some(strategy)) => ranked.push(strategy),
            Ok(None) => {}
            Err(PlannerError::Cancelled) => return Err(PlannerError::Cancelled),
            Err(e) => {
                tracing::warn!(stock_allocation = stock, error = %e, "allocation candidate failed");
            }
        }
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::info!(
        analyzed = candidates.len(),
        valid = ranked.len(),
        "allocation analysis complete"
    );

    let (Some(conservative), Some(balanced), Some(aggressive)) = (
        select_conservative(&ranked),
        select_balanced(&ranked),
        select_aggressive(&ranked, assumptions.aggressive_min_success_rate),
    ) else {
        return Ok(AllocationAnalysisOutcome::Insufficient {
            reason: "No allocation survived any historical period at the minimum withdrawal rate."
                .to_string(),
        });
    };

    let analysis = AllocationAnalysis {
        conservative: conservative.with_role(AllocationRole::Conservative),
        balanced: balanced.with_role(AllocationRole::Balanced),
        aggressive: aggressive.with_role(AllocationRole::Aggressive),
        retirement_duration: inputs.duration_years,
        target_success_rate: inputs.target_success_pct,
        total_portfolio_balance: to_money(inputs.total_balance()),
        allocations_analyzed: candidates.len(),
        methodology: methodology(series),
        ranked,
    };

    Ok(AllocationAnalysisOutcome::Complete(Box::new(analysis)))
}

