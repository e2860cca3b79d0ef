//! Historical safe-withdrawal backtesting library
//!
//! This crate replays a retirement portfolio against every rolling window of
//! an annual market history and searches for withdrawal strategies that meet a
//! target probability of not running out of money. It supports:
//! - Rolling-window simulation with inflation-indexed withdrawals
//! - Binary search for the sustainable withdrawal rate or the required portfolio
//! - Tax-optimized withdrawal ordering across taxable and tax-deferred accounts
//! - Progressive ordinary income tax and stacked long-term capital gains tax
//! - Stock/bond allocation sweeps with three named strategies
//! - Early-withdrawal penalties and Roth conversion ladder comparison
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use retireplan_core::{HistoricalSeries, Planner, StandardRequest, SweepProgress};
//!
//! let series = HistoricalSeries::load("data/market_history.json".as_ref())?;
//! let planner = Planner::new(Arc::new(series));
//! let result = planner.calculate(
//!     &StandardRequest {
//!         current_age: 45,
//!         retirement_age: 65,
//!         retirement_account_balance: 600_000.0,
//!         taxable_account_balance: 400_000.0,
//!         success_rate_threshold: 0.90,
//!     },
//!     &SweepProgress::default(),
//! )?;
//! println!("Safe withdrawal rate: {:.2}%", result.withdrawal_rate_pct);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod early_retirement;
pub mod error;
pub mod optimization;
pub mod planner;
pub mod reverse;
pub mod simulation;
pub mod taxes;
pub mod withdrawal;

// ============================================================================
// Type definition and support modules
// ============================================================================

pub mod config;
pub mod format;
pub mod model;
pub mod progress;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::Assumptions;
pub use error::{DataLoadError, PlannerError, ValidationError};
pub use model::{
    AllocationAnalysisOutcome, CalculationResult, HistoricalSeries, MarketYear,
    ReverseCalculationResult, ReverseRequest, RiskProfile, StandardRequest,
};
pub use planner::Planner;
pub use progress::SweepProgress;
