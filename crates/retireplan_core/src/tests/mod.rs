//! Integration tests for the retireplan backtesting engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Worked retirement scenarios end to end through the solvers
//! - `monotonicity` - Property tests for the relations the binary searches rely on
//! - `planner` - Planner entry points over a series loaded from JSON


use crate::model::{HistoricalSeries, MarketYear};

/// A series of `years` consecutive years starting in 1926 that repeats `decade`
pub(crate) fn repeating_series(
    years: i32,
    decade: &[(f64, f64, f64)],
) -> HistoricalSeries {
    HistoricalSeries::new(
        (0..years)
            .map(|i| {
                let (equity_return, bond_return, inflation) = decade[i as usize % decade.len()];
                MarketYear {
                    year: 1926 + i,
                    equity_return,
                    bond_return,
                    inflation,
                }
            })
            .collect(),
    )
    .unwrap()
}

/// Boom and bust decade with positive average real returns
pub(crate) const CYCLICAL_DECADE: [(f64, f64, f64); 10] = [
    (0.26, 0.02, 0.03),
    (-0.14, 0.07, 0.05),
    (0.19, 0.03, 0.02),
    (0.08, 0.04, 0.03),
    (-0.31, 0.09, 0.01),
    (0.33, 0.00, 0.02),
    (0.04, 0.05, 0.06),
    (0.13, 0.03, 0.04),
    (-0.08, 0.06, 0.02),
    (0.17, 0.02, 0.03),
];
