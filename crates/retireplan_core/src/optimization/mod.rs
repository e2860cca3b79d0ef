//! Solvers for the sustainable withdrawal rate and the required portfolio
//!
//! # Example
//!
//! ```ignore
//! use retireplan_core::optimization::{PortfolioGoal, solve_required_portfolio};
//!
//! let goal = PortfolioGoal {
//!     desired_after_tax_income: 80_000.0,
//!     retirement_age: 60,
//!     current_age: 40,
//!     target_success_rate: 0.90,
//!     stock_allocation: 0.60,
//! };
//! let solution = solve_required_portfolio(&series, &goal, &Assumptions::default(), &progress)?;
//! println!("Required portfolio: ${:.0}", solution.portfolio);
//! ```

mod binary_search;
mod result;

pub use binary_search::{
    PortfolioGoal, after_tax_income_for, solve_required_portfolio, solve_withdrawal_rate,
};
pub use result::{
    IncomeProbe, PortfolioSolution, ProbeRecord, RateSolution, SearchHistory, TerminationReason,
};
