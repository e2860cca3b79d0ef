//! Rolling-window historical backtest
//!
//! A path starts in some historical year and replays consecutive years of
//! market data. Each year, in order:
//!
//! 1. the year's data is looked up (missing data fails the path),
//! 2. the inflation-adjusted withdrawal is taken,
//! 3. a balance at or below zero fails the path before any return is applied,
//! 4. the blended stock/bond return is applied,
//! 5. next year's withdrawal grows by this year's inflation.
//!
//! A path succeeds when the balance is still positive after the final year.

use crate::error::{PlannerError, Result};
use crate::model::{AggregateStatistics, HistoricalSeries, SimulationInput, SimulationOutcome};
use crate::progress::SweepProgress;

/// Replay one window, reporting each applied return to `on_return`.
/// Returns `(success, final_balance)`; a failed path ends at zero.
fn replay(
    series: &HistoricalSeries,
    input: &SimulationInput,
    mut on_return: impl FnMut(f64),
) -> (bool, f64) {
    let mut balance = input.initial_balance;
    let mut withdrawal = input.initial_balance * input.withdrawal_rate;

    for offset in 0..input.duration_years {
        let Some(year) = i32::try_from(offset)
            .ok()
            .and_then(|o| input.start_year.checked_add(o))
            .and_then(|y| series.get_year(y))
        else {
            return (false, 0.0);
        };

        balance -= withdrawal;
        if balance <= 0.0 {
            return (false, 0.0);
        }

        let portfolio_return = year.blended_return(input.stock_allocation);
        on_return(portfolio_return);
        balance *= 1.0 + portfolio_return;

        withdrawal *= 1.0 + year.inflation;
    }

    (balance > 0.0, balance)
}

/// Simulate a single retirement path starting at `input.start_year`
#[must_use]
pub fn simulate_one_path(series: &HistoricalSeries, input: &SimulationInput) -> SimulationOutcome {
    let mut realized_annual_returns = Vec::with_capacity(input.duration_years as usize);
    let (success, final_balance) = replay(series, input, |r| realized_annual_returns.push(r));

    SimulationOutcome {
        success,
        final_balance,
        realized_annual_returns,
    }
}

/// Start years of every complete window of `duration_years`
fn window_starts(series: &HistoricalSeries, duration_years: u32) -> impl Iterator<Item = i32> {
    let (min_year, max_year) = series.year_range();
    let last_start = i64::from(max_year) - i64::from(duration_years);
    let last_start = i32::try_from(last_start).unwrap_or(i32::MIN);
    min_year..=last_start
}

fn input_for(
    initial_balance: f64,
    withdrawal_rate: f64,
    duration_years: u32,
    stock_allocation: f64,
    start_year: i32,
) -> SimulationInput {
    SimulationInput {
        initial_balance,
        withdrawal_rate,
        start_year,
        duration_years,
        stock_allocation,
    }
}

/// Percentage (0-100) of rolling windows that survive.
///
/// Zero available windows yields 0 rather than an error.
pub fn success_rate(
    series: &HistoricalSeries,
    initial_balance: f64,
    withdrawal_rate: f64,
    duration_years: u32,
    stock_allocation: f64,
    progress: &SweepProgress,
) -> Result<f64> {
    let mut successes = 0usize;
    let mut total = 0usize;

    for start_year in window_starts(series, duration_years) {
        if progress.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        let input = input_for(
            initial_balance,
            withdrawal_rate,
            duration_years,
            stock_allocation,
            start_year,
        );
        if replay(series, &input, |_| {}).0 {
            successes += 1;
        }
        total += 1;
        progress.increment();
    }

    Ok(percentage(successes, total))
}

/// Simulate every rolling window and summarize the outcomes.
///
/// Median, best, and worst final values come from successful windows only
/// (0 when none succeed). Volatility is the population standard deviation of
/// each window's average annual return, in percent, over all windows.
pub fn aggregate_over_all_windows(
    series: &HistoricalSeries,
    initial_balance: f64,
    withdrawal_rate: f64,
    duration_years: u32,
    stock_allocation: f64,
    progress: &SweepProgress,
) -> Result<AggregateStatistics> {
    let mut final_values = Vec::new();
    let mut average_returns = Vec::new();
    let mut failure_periods = Vec::new();

    for start_year in window_starts(series, duration_years) {
        if progress.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        let input = input_for(
            initial_balance,
            withdrawal_rate,
            duration_years,
            stock_allocation,
            start_year,
        );
        let outcome = simulate_one_path(series, &input);

        if outcome.success {
            final_values.push(outcome.final_balance);
        } else {
            let end_year = i64::from(start_year) + i64::from(duration_years) - 1;
            failure_periods.push(format!("{start_year}-{end_year}"));
        }
        average_returns.push(outcome.average_return());
        progress.increment();
    }

    let total_count = average_returns.len();
    if total_count == 0 {
        tracing::debug!(duration_years, "no complete rolling windows in series");
        return Ok(AggregateStatistics::default());
    }

    final_values.sort_by(f64::total_cmp);
    let successful_count = final_values.len();

    Ok(AggregateStatistics {
        success_rate: percentage(successful_count, total_count),
        median_final_value: median(&final_values),
        best_case_final_value: final_values.last().copied().unwrap_or(0.0),
        worst_case_final_value: final_values.first().copied().unwrap_or(0.0),
        volatility: population_std_dev(&average_returns) * 100.0,
        successful_count,
        total_count,
        failure_periods,
    })
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Median of sorted values, averaging the middle pair for even counts
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        _ => sorted[n / 2],
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
