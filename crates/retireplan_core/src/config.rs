//! Planning assumptions shared by every calculation
//!
//! Life expectancy, solver bounds, the candidate allocation set, and the risk
//! profile presets live here so each calculation reads them from one place.
//! All fields have serde defaults, so a partial file overrides only what it names.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::RiskProfile;

/// Bounds for the withdrawal-rate binary search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSearch {
    #[serde(default = "default_min_rate")]
    pub min_rate: f64,
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,
    /// Search stops once the bracket is no wider than this
    #[serde(default = "default_rate_tolerance")]
    pub tolerance: f64,
}

fn default_min_rate() -> f64 {
    0.01
}

fn default_max_rate() -> f64 {
    0.15
}

fn default_rate_tolerance() -> f64 {
    0.0001
}

impl Default for RateSearch {
    fn default() -> Self {
        Self {
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            tolerance: default_rate_tolerance(),
        }
    }
}

/// Bounds for the required-portfolio binary search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSearch {
    #[serde(default = "default_min_portfolio")]
    pub min_portfolio: f64,
    #[serde(default = "default_max_portfolio")]
    pub max_portfolio: f64,
    /// Dollar tolerance on both the income match and the bracket width
    #[serde(default = "default_portfolio_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_min_portfolio() -> f64 {
    100_000.0
}

fn default_max_portfolio() -> f64 {
    50_000_000.0
}

fn default_portfolio_tolerance() -> f64 {
    1_000.0
}

fn default_max_iterations() -> usize {
    50
}

impl Default for PortfolioSearch {
    fn default() -> Self {
        Self {
            min_portfolio: default_min_portfolio(),
            max_portfolio: default_max_portfolio(),
            tolerance: default_portfolio_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Success target and stock share for one risk profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePreset {
    pub profile: RiskProfile,
    /// Fraction, e.g. 0.95
    pub target_success_rate: f64,
    pub stock_allocation: f64,
}

/// Every tunable assumption behind the calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Age the plan must fund through; retirement duration is measured against it
    #[serde(default = "default_life_expectancy")]
    pub life_expectancy: u32,

    #[serde(default)]
    pub rate_search: RateSearch,

    #[serde(default)]
    pub portfolio_search: PortfolioSearch,

    /// Stock share used by the standard calculation
    #[serde(default = "default_stock_allocation")]
    pub default_stock_allocation: f64,

    /// Stock shares evaluated by the allocation analysis
    #[serde(default = "default_allocation_candidates")]
    pub allocation_candidates: Vec<f64>,

    /// Minimum success rate (percent) for the aggressive pick
    #[serde(default = "default_aggressive_floor")]
    pub aggressive_min_success_rate: f64,

    #[serde(default = "default_profile_presets")]
    pub risk_profiles: Vec<ProfilePreset>,

    /// The reverse calculation applies penalties when retiring before this age
    #[serde(default = "default_penalty_check_age")]
    pub penalty_check_age: u32,
}

fn default_life_expectancy() -> u32 {
    95
}

fn default_stock_allocation() -> f64 {
    0.60
}

fn default_allocation_candidates() -> Vec<f64> {
    vec![0.30, 0.40, 0.50, 0.60, 0.70, 0.80, 0.90, 1.00]
}

fn default_aggressive_floor() -> f64 {
    85.0
}

fn default_profile_presets() -> Vec<ProfilePreset> {
    vec![
        ProfilePreset {
            profile: RiskProfile::Conservative,
            target_success_rate: 0.95,
            stock_allocation: 0.40,
        },
        ProfilePreset {
            profile: RiskProfile::Moderate,
            target_success_rate: 0.90,
            stock_allocation: 0.60,
        },
        ProfilePreset {
            profile: RiskProfile::Aggressive,
            target_success_rate: 0.85,
            stock_allocation: 0.80,
        },
    ]
}

fn default_penalty_check_age() -> u32 {
    59
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            life_expectancy: default_life_expectancy(),
            rate_search: RateSearch::default(),
            portfolio_search: PortfolioSearch::default(),
            default_stock_allocation: default_stock_allocation(),
            allocation_candidates: default_allocation_candidates(),
            aggressive_min_success_rate: default_aggressive_floor(),
            risk_profiles: default_profile_presets(),
            penalty_check_age: default_penalty_check_age(),
        }
    }
}

impl Assumptions {
    /// Years from retirement to life expectancy, or `None` when there are none
    #[must_use]
    pub fn retirement_duration(&self, retirement_age: u32) -> Option<u32> {
        self.life_expectancy
            .checked_sub(retirement_age)
            .filter(|years| *years > 0)
    }

    #[must_use]
    pub fn preset(&self, profile: RiskProfile) -> Option<&ProfilePreset> {
        self.risk_profiles.iter().find(|p| p.profile == profile)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        let rate = &self.rate_search;
        if !(rate.min_rate > 0.0 && rate.min_rate < rate.max_rate && rate.tolerance > 0.0) {
            errors.push(
                "rate_search",
                "requires 0 < min_rate < max_rate and a positive tolerance",
            );
        }
        let portfolio = &self.portfolio_search;
        if !(portfolio.min_portfolio > 0.0
            && portfolio.min_portfolio < portfolio.max_portfolio
            && portfolio.tolerance > 0.0
            && portfolio.max_iterations > 0)
        {
            errors.push(
                "portfolio_search",
                "requires 0 < min_portfolio < max_portfolio, a positive tolerance, and at least one iteration",
            );
        }
        let in_unit = |share: f64| (0.0..=1.0).contains(&share);
        if !in_unit(self.default_stock_allocation) {
            errors.push("default_stock_allocation", "must be within [0, 1]");
        }
        if self.allocation_candidates.is_empty()
            || !self.allocation_candidates.iter().copied().all(in_unit)
        {
            errors.push(
                "allocation_candidates",
                "must be a non-empty list of shares within [0, 1]",
            );
        }
        if self
            .risk_profiles
            .iter()
            .any(|p| !in_unit(p.stock_allocation) || !in_unit(p.target_success_rate))
        {
            errors.push(
                "risk_profiles",
                "stock allocation and target success rate must be within [0, 1]",
            );
        }

        errors.into_result()
    }
}
