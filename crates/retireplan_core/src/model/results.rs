use serde::{Deserialize, Serialize};

/// Parameters for one rolling-window backtest path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub initial_balance: f64,
    /// First-year withdrawal as a fraction of the initial balance
    pub withdrawal_rate: f64,
    pub start_year: i32,
    pub duration_years: u32,
    /// Stock share in [0, 1]; the remainder is bonds
    pub stock_allocation: f64,
}

/// Result of replaying one historical window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub success: bool,
    pub final_balance: f64,
    /// Blended portfolio return applied in each survived year
    pub realized_annual_returns: Vec<f64>,
}

impl SimulationOutcome {
    /// Mean of the applied annual returns, 0 when none were applied
    #[must_use]
    pub fn average_return(&self) -> f64 {
        if self.realized_annual_returns.is_empty() {
            0.0
        } else {
            self.realized_annual_returns.iter().sum::<f64>()
                / self.realized_annual_returns.len() as f64
        }
    }
}

/// Statistics over every rolling window of a given duration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    /// Percentage of windows that ended with money left, 0-100
    pub success_rate: f64,
    pub median_final_value: f64,
    pub best_case_final_value: f64,
    pub worst_case_final_value: f64,
    /// Population standard deviation of per-path average returns, in percent
    pub volatility: f64,
    pub successful_count: usize,
    pub total_count: usize,
    /// Failed windows formatted as `"start-end"`
    pub failure_periods: Vec<String>,
}

impl AggregateStatistics {
    #[must_use]
    pub fn has_successes(&self) -> bool {
        self.successful_count > 0
    }
}
