//! Scoring and the three named picks

use std::cmp::Ordering;

use crate::model::AllocationStrategy;

const SUCCESS_WEIGHT: f64 = 0.60;
const GROWTH_CAP: f64 = 25.0;
const GROWTH_WEIGHT: f64 = 10.0;
const STABILITY_CAP: f64 = 15.0;
const VOLATILITY_PENALTY: f64 = 0.5;

/// Composite score: weighted success rate, capped median growth multiple,
/// and a stability bonus that shrinks with volatility.
#[must_use]
pub fn score(success_rate: f64, median_final_value: f64, volatility: f64, initial: f64) -> f64 {
    let growth = if initial > 0.0 {
        (GROWTH_WEIGHT * median_final_value / initial).min(GROWTH_CAP)
    } else {
        0.0
    };
    let stability = (STABILITY_CAP - VOLATILITY_PENALTY * volatility).max(0.0);

    SUCCESS_WEIGHT * success_rate + growth + stability
}

// `min_by` keeps the first of equal elements, so every comparator below sorts
// the preferred candidate lowest.

fn safest_first(a: &AllocationStrategy, b: &AllocationStrategy) -> Ordering {
    b.statistics
        .success_rate
        .total_cmp(&a.statistics.success_rate)
        .then(a.statistics.volatility.total_cmp(&b.statistics.volatility))
}

fn richest_first(a: &AllocationStrategy, b: &AllocationStrategy) -> Ordering {
    b.statistics
        .median_final_value
        .total_cmp(&a.statistics.median_final_value)
        .then(b.stock_pct.cmp(&a.stock_pct))
}

/// Highest success rate, ties to the lowest volatility
#[must_use]
pub fn select_conservative(candidates: &[AllocationStrategy]) -> Option<&AllocationStrategy> {
    candidates.iter().min_by(|a, b| safest_first(a, b))
}

/// Highest score
#[must_use]
pub fn select_balanced(candidates: &[AllocationStrategy]) -> Option<&AllocationStrategy> {
    candidates
        .iter()
        .min_by(|a, b| b.score.total_cmp(&a.score))
}

/// Highest median final value among candidates at or above `min_success_rate`,
/// falling back to the highest median overall when none qualify.
#[must_use]
pub fn select_aggressive(
    candidates: &[AllocationStrategy],
    min_success_rate: f64,
) -> Option<&AllocationStrategy> {
    candidates
        .iter()
        .filter(|c| c.statistics.success_rate >= min_success_rate)
        .min_by(|a, b| richest_first(a, b))
        .or_else(|| candidates.iter().min_by(|a, b| richest_first(a, b)))
}
