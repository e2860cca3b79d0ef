//! Criterion benchmarks for retireplan_core backtesting
//!
//! Run with: cargo bench -p retireplan_core

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use retireplan_core::config::{Assumptions, RateSearch};
use retireplan_core::model::{HistoricalSeries, MarketYear, SimulationInput};
use retireplan_core::optimization::solve_withdrawal_rate;
use retireplan_core::simulation::{aggregate_over_all_windows, simulate_one_path};
use retireplan_core::{Planner, ReverseRequest, StandardRequest, SweepProgress};

fn create_series() -> HistoricalSeries {
    let equity = [0.26, -0.14, 0.19, 0.08, -0.31, 0.33, 0.04, 0.13, -0.08, 0.17];
    let bond = [0.02, 0.07, 0.03, 0.04, 0.09, 0.00, 0.05, 0.03, 0.06, 0.02];
    HistoricalSeries::new(
        (0..98)
            .map(|i| MarketYear {
                year: 1926 + i,
                equity_return: equity[i as usize % 10],
                bond_return: bond[i as usize % 10],
                inflation: 0.03,
            })
            .collect(),
    )
    .expect("valid synthetic series")
}

fn bench_single_path(c: &mut Criterion) {
    let series = create_series();
    let input = SimulationInput {
        initial_balance: 1_000_000.0,
        withdrawal_rate: 0.04,
        start_year: 1950,
        duration_years: 30,
        stock_allocation: 0.6,
    };

    c.bench_function("single_path_30yr", |b| {
        b.iter(|| simulate_one_path(black_box(&series), black_box(&input)))
    });
}

fn bench_rolling_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_windows");
    let series = create_series();
    let progress = SweepProgress::default();

    for duration in [20u32, 30, 40].iter() {
        group.bench_with_input(BenchmarkId::new("duration", duration), duration, |b, &d| {
            b.iter(|| {
                aggregate_over_all_windows(
                    black_box(&series),
                    1_000_000.0,
                    0.04,
                    d,
                    0.6,
                    &progress,
                )
            })
        });
    }

    group.finish();
}

fn bench_rate_search(c: &mut Criterion) {
    let series = create_series();
    let progress = SweepProgress::default();
    let search = RateSearch::default();

    c.bench_function("withdrawal_rate_search_30yr", |b| {
        b.iter(|| {
            solve_withdrawal_rate(
                black_box(&series),
                1_000_000.0,
                30,
                90.0,
                0.6,
                &search,
                &progress,
            )
        })
    });
}

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");
    group.sample_size(10);
    let planner = Planner::with_assumptions(Arc::new(create_series()), Assumptions::default());
    let progress = SweepProgress::default();

    let standard = StandardRequest {
        current_age: 45,
        retirement_age: 65,
        retirement_account_balance: 700_000.0,
        taxable_account_balance: 300_000.0,
        success_rate_threshold: 0.90,
    };
    group.bench_function("allocation_sweep", |b| {
        b.iter(|| planner.analyze_allocations(black_box(&standard), &progress))
    });

    let reverse = ReverseRequest {
        desired_after_tax_income: 80_000.0,
        current_age: 40,
        retirement_age: 55,
        success_rate_threshold: 0.90,
        current_retirement_account_balance: Some(400_000.0),
        current_taxable_account_balance: None,
        annual_savings: Some(40_000.0),
        preferred_risk_profile: None,
    };
    group.bench_function("reverse_all_profiles", |b| {
        b.iter(|| planner.reverse(black_box(&reverse), &progress))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_path,
    bench_rolling_windows,
    bench_rate_search,
    bench_planner,
);
criterion_main!(benches);
