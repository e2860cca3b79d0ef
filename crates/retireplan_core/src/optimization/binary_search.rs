//! Binary searches over withdrawal rate and portfolio size
//!
//! Both searches rely on monotonic relations: the success rate never rises as
//! the withdrawal rate rises, and after-tax income never falls as the
//! portfolio grows.

use rust_decimal::Decimal;

use crate::config::{Assumptions, RateSearch};
use crate::early_retirement::total_penalties;
use crate::error::{PlannerError, Result};
use crate::model::HistoricalSeries;
use crate::progress::SweepProgress;
use crate::simulation::success_rate;
use crate::taxes::{ordinary_income_tax, to_f64, to_money};

use super::result::{
    IncomeProbe, PortfolioSolution, ProbeRecord, RateSolution, SearchHistory, TerminationReason,
};

/// Find the highest withdrawal rate whose success rate meets `target_success_pct`.
///
/// Returns the lower bound of the final bracket. When no probe meets the target
/// this is the search minimum, which callers treat as the floor rather than an
/// error.
pub fn solve_withdrawal_rate(
    series: &HistoricalSeries,
    total_balance: f64,
    duration_years: u32,
    target_success_pct: f64,
    stock_allocation: f64,
    search: &RateSearch,
    progress: &SweepProgress,
) -> Result<RateSolution> {
    let mut low = search.min_rate;
    let mut high = search.max_rate;
    let mut history = SearchHistory::new();
    let mut iterations = 0;

    while high - low > search.tolerance {
        iterations += 1;
        let mid = f64::midpoint(low, high);
        let achieved = success_rate(
            series,
            total_balance,
            mid,
            duration_years,
            stock_allocation,
            progress,
        )?;
        let meets_target = achieved >= target_success_pct;

        tracing::debug!(
            rate = mid,
            success_rate = achieved,
            target = target_success_pct,
            meets_target,
            "withdrawal rate probe"
        );

        history.record(ProbeRecord {
            value: mid,
            objective_value: achieved,
            raised_lower_bound: meets_target,
        });

        if meets_target {
            low = mid;
        } else {
            high = mid;
        }
    }

    tracing::debug!(rate = low, iterations, "withdrawal rate solved");

    Ok(RateSolution {
        rate: low,
        iterations,
        history,
    })
}

/// What the required-portfolio search is aiming for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioGoal {
    pub desired_after_tax_income: f64,
    pub retirement_age: u32,
    pub current_age: u32,
    /// Fraction, e.g. 0.90
    pub target_success_rate: f64,
    pub stock_allocation: f64,
}

/// After-tax income a portfolio supports.
///
/// The whole gross withdrawal is taxed as ordinary income, and when retiring
/// before the penalty check age the amortized annual early-withdrawal penalty
/// on that withdrawal is subtracted as well.
pub fn after_tax_income_for(
    series: &HistoricalSeries,
    portfolio: f64,
    goal: &PortfolioGoal,
    duration_years: u32,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<IncomeProbe> {
    let rate = solve_withdrawal_rate(
        series,
        portfolio,
        duration_years,
        goal.target_success_rate * 100.0,
        goal.stock_allocation,
        &assumptions.rate_search,
        progress,
    )?
    .rate;

    let gross_withdrawal = to_money(portfolio * rate);
    let tax = ordinary_income_tax(gross_withdrawal);
    let annual_penalty = if goal.retirement_age < assumptions.penalty_check_age {
        total_penalties(goal.retirement_age, duration_years, gross_withdrawal).per_year_penalty
    } else {
        Decimal::ZERO
    };

    Ok(IncomeProbe {
        portfolio,
        withdrawal_rate: rate,
        gross_withdrawal,
        tax,
        annual_penalty,
        after_tax_income: gross_withdrawal - tax - annual_penalty,
    })
}

/// Find the portfolio size whose after-tax income matches the goal.
///
/// Stops early when a probe lands within the tolerance of the desired income,
/// or when the bracket narrows below the tolerance, and otherwise returns the
/// bracket midpoint once the iteration cap is reached. Non-convergence is not
/// an error.
pub fn solve_required_portfolio(
    series: &HistoricalSeries,
    goal: &PortfolioGoal,
    assumptions: &Assumptions,
    progress: &SweepProgress,
) -> Result<PortfolioSolution> {
    let duration_years = assumptions
        .retirement_duration(goal.retirement_age)
        .ok_or(PlannerError::InvalidDuration {
            retirement_age: goal.retirement_age,
            life_expectancy: assumptions.life_expectancy,
        })?;

    let search = &assumptions.portfolio_search;
    let mut low = search.min_portfolio;
    let mut high = search.max_portfolio;
    let mut history = SearchHistory::new();

    let _span = tracing::debug_span!(
        "required_portfolio",
        current_age = goal.current_age,
        retirement_age = goal.retirement_age,
        stock_allocation = goal.stock_allocation
    )
    .entered();

    for iteration in 1..=search.max_iterations {
        let mid = f64::midpoint(low, high);
        let probe = after_tax_income_for(series, mid, goal, duration_years, assumptions, progress)?;
        let income = to_f64(probe.after_tax_income);
        let shortfall = income < goal.desired_after_tax_income;

        history.record(ProbeRecord {
            value: mid,
            objective_value: income,
            raised_lower_bound: shortfall,
        });

        tracing::debug!(
            iteration,
            portfolio = mid,
            after_tax_income = income,
            desired = goal.desired_after_tax_income,
            "portfolio probe"
        );

        if (income - goal.desired_after_tax_income).abs() <= search.tolerance {
            tracing::info!(portfolio = mid, iteration, "required portfolio converged");
            return Ok(PortfolioSolution {
                portfolio: mid,
                iterations: iteration,
                termination_reason: TerminationReason::Converged,
                history,
            });
        }

        if shortfall {
            low = mid;
        } else {
            high = mid;
        }

        if high - low < search.tolerance {
            return Ok(PortfolioSolution {
                portfolio: f64::midpoint(low, high),
                iterations: iteration,
                termination_reason: TerminationReason::BracketCollapsed,
                history,
            });
        }
    }

    tracing::warn!(
        max_iterations = search.max_iterations,
        "required portfolio search hit the iteration cap"
    );

    Ok(PortfolioSolution {
        portfolio: f64::midpoint(low, high),
        iterations: search.max_iterations,
        termination_reason: TerminationReason::MaxIterationsReached,
        history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarketYear;

    fn flat_series(years: i32, equity: f64, bond: f64, inflation: f64) -> HistoricalSeries {
        HistoricalSeries::new(
            (1926..1926 + years)
                .map(|year| MarketYear {
                    year,
                    equity_return: equity,
                    bond_return: bond,
                    inflation,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_return_series_closed_form() {
        // With no growth or inflation a path survives iff rate * years < 1
        let series = flat_series(100, 0.0, 0.0, 0.0);
        let solution = solve_withdrawal_rate(
            &series,
            1_000_000.0,
            30,
            100.0,
            0.6,
            &RateSearch::default(),
            &SweepProgress::default(),
        )
        .unwrap();

        let closed_form = 1.0 / 30.0;
        assert!(solution.rate < closed_form);
        assert!(closed_form - solution.rate <= RateSearch::default().tolerance);
        assert!(solution.iterations > 0);
        assert_eq!(solution.history.num_probes(), solution.iterations);
    }

    #[test]
    fn test_unreachable_target_returns_floor() {
        // A deep loss every year fails even the minimum rate
        let series = flat_series(60, -0.5, -0.5, 0.0);
        let search = RateSearch::default();
        let solution = solve_withdrawal_rate(
            &series,
            1_000_000.0,
            30,
            90.0,
            0.6,
            &search,
            &SweepProgress::default(),
        )
        .unwrap();
        assert_eq!(solution.rate, search.min_rate);
        assert!(solution.history.best_accepted().is_none());
    }

    #[test]
    fn test_generous_returns_hit_ceiling() {
        let series = flat_series(60, 0.5, 0.5, 0.0);
        let search = RateSearch::default();
        let solution = solve_withdrawal_rate(
            &series,
            1_000_000.0,
            30,
            95.0,
            0.6,
            &search,
            &SweepProgress::default(),
        )
        .unwrap();
        assert!(search.max_rate - solution.rate <= search.tolerance);
    }

    #[test]
    fn test_invalid_duration() {
        let series = flat_series(100, 0.07, 0.03, 0.02);
        let goal = PortfolioGoal {
            desired_after_tax_income: 50_000.0,
            retirement_age: 95,
            current_age: 40,
            target_success_rate: 0.9,
            stock_allocation: 0.6,
        };
        let err = solve_required_portfolio(
            &series,
            &goal,
            &Assumptions::default(),
            &SweepProgress::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            PlannerError::InvalidDuration {
                retirement_age: 95,
                life_expectancy: 95
            }
        );
    }

    #[test]
    fn test_required_portfolio_round_trip() {
        let series = flat_series(100, 0.07, 0.03, 0.02);
        let assumptions = Assumptions::default();
        let progress = SweepProgress::default();
        let goal = PortfolioGoal {
            desired_after_tax_income: 60_000.0,
            retirement_age: 65,
            current_age: 45,
            target_success_rate: 0.9,
            stock_allocation: 0.6,
        };

        let solution = solve_required_portfolio(&series, &goal, &assumptions, &progress).unwrap();
        assert!(solution.portfolio > assumptions.portfolio_search.min_portfolio);
        assert!(solution.portfolio < assumptions.portfolio_search.max_portfolio);

        let probe =
            after_tax_income_for(&series, solution.portfolio, &goal, 30, &assumptions, &progress)
                .unwrap();
        let income = to_f64(probe.after_tax_income);
        // Converged within tolerance, or the bracket collapsed around a step in income
        if solution.converged() {
            assert!((income - 60_000.0).abs() <= 1_000.0);
        } else {
            assert_eq!(solution.termination_reason, TerminationReason::BracketCollapsed);
        }
        assert_eq!(probe.annual_penalty, Decimal::ZERO);
    }

    #[test]
    fn test_early_retirement_probe_subtracts_penalty() {
        let series = flat_series(100, 0.07, 0.03, 0.02);
        let assumptions = Assumptions::default();
        let goal = PortfolioGoal {
            desired_after_tax_income: 60_000.0,
            retirement_age: 50,
            current_age: 35,
            target_success_rate: 0.9,
            stock_allocation: 0.6,
        };
        let probe = after_tax_income_for(
            &series,
            1_500_000.0,
            &goal,
            45,
            &assumptions,
            &SweepProgress::default(),
        )
        .unwrap();
        assert_eq!(
            probe.annual_penalty,
            probe.gross_withdrawal * rust_decimal_macros::dec!(0.10)
        );
        assert_eq!(
            probe.after_tax_income,
            probe.gross_withdrawal - probe.tax - probe.annual_penalty
        );
    }

    #[test]
    fn test_cancelled_search() {
        let series = flat_series(100, 0.07, 0.03, 0.02);
        let progress = SweepProgress::default();
        progress.cancel();
        let result = solve_withdrawal_rate(
            &series,
            1_000_000.0,
            30,
            90.0,
            0.6,
            &RateSearch::default(),
            &progress,
        );
        assert_eq!(result.unwrap_err(), PlannerError::Cancelled);
    }
}
