//! Asset allocation analysis
//!
//! Sweeps candidate stock/bond mixes, solves each for its sustainable
//! withdrawal rate, scores the survivors, and names three of them:
//!
//! - **Conservative**: highest success rate, ties to the lowest volatility
//! - **Balanced**: highest composite score
//! - **Aggressive**: highest median final value among candidates that clear
//!   the success floor

mod allocation;
mod selection;

pub use allocation::{AllocationInputs, analyze_allocations, evaluate_candidate};
pub use selection::{score, select_aggressive, select_balanced, select_conservative};
