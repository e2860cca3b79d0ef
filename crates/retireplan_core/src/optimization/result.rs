//! Solver result types
//!
//! Each solver records every probe it evaluates so callers can inspect how the
//! search converged.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single probe during a binary search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeRecord {
    /// The probed value (a withdrawal rate or a portfolio size)
    pub value: f64,

    /// What the probe measured: success rate for rate searches,
    /// after-tax income for portfolio searches
    pub objective_value: f64,

    /// Whether the search moved its lower bound up to this value
    pub raised_lower_bound: bool,
}

/// Every probe of one search, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHistory {
    pub probes: Vec<ProbeRecord>,
}

impl SearchHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, probe: ProbeRecord) {
        self.probes.push(probe);
    }

    #[must_use]
    pub fn num_probes(&self) -> usize {
        self.probes.len()
    }

    /// Highest probed value that raised the lower bound
    #[must_use]
    pub fn best_accepted(&self) -> Option<&ProbeRecord> {
        self.probes
            .iter()
            .filter(|p| p.raised_lower_bound)
            .max_by(|a, b| a.value.total_cmp(&b.value))
    }
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// A probe landed within tolerance of the goal
    Converged,

    /// The bracket became narrower than the tolerance
    BracketCollapsed,

    /// The iteration cap was reached; the bracket midpoint is a best estimate
    MaxIterationsReached,
}

/// Highest withdrawal rate meeting a success target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    /// Lower bound of the final bracket, as a fraction
    pub rate: f64,
    pub iterations: usize,
    pub history: SearchHistory,
}

/// After-tax income produced by one portfolio size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeProbe {
    pub portfolio: f64,
    pub withdrawal_rate: f64,
    pub gross_withdrawal: Decimal,
    pub tax: Decimal,
    /// Amortized early-withdrawal penalty, zero when none applies
    pub annual_penalty: Decimal,
    pub after_tax_income: Decimal,
}

/// Smallest portfolio producing the desired after-tax income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSolution {
    pub portfolio: f64,
    pub iterations: usize,
    pub termination_reason: TerminationReason,
    pub history: SearchHistory,
}

impl PortfolioSolution {
    #[must_use]
    pub fn converged(&self) -> bool {
        self.termination_reason == TerminationReason::Converged
    }
}
