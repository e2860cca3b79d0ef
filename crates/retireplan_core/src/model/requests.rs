//! Request types and their validation
//!
//! Validation collects every violation into one [`ValidationError`] before any
//! computation starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 100;
const STANDARD_THRESHOLDS: [f64; 3] = [0.90, 0.95, 0.98];
const MIN_REVERSE_THRESHOLD: f64 = 0.85;
const MAX_REVERSE_THRESHOLD: f64 = 0.98;
const MIN_DESIRED_INCOME: f64 = 10_000.0;
const MAX_DESIRED_INCOME: f64 = 10_000_000.0;

/// Named stock allocation and success target used by the reverse calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(format!("unknown risk profile: {other}")),
        }
    }
}

/// Inputs for the standard withdrawal-rate calculation and allocation analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRequest {
    pub current_age: u32,
    pub retirement_age: u32,
    /// Tax-deferred balance (401k, traditional IRA)
    pub retirement_account_balance: f64,
    pub taxable_account_balance: f64,
    /// Target success rate as a fraction: 0.90, 0.95 or 0.98
    pub success_rate_threshold: f64,
}

impl StandardRequest {
    #[must_use]
    pub fn total_balance(&self) -> f64 {
        self.retirement_account_balance + self.taxable_account_balance
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        check_age(&mut errors, "current_age", self.current_age);
        check_age(&mut errors, "retirement_age", self.retirement_age);
        if self.retirement_age < self.current_age {
            errors.push(
                "retirement_age",
                "retirement age must be greater than or equal to current age",
            );
        }
        check_balance(
            &mut errors,
            "retirement_account_balance",
            Some(self.retirement_account_balance),
        );
        check_balance(
            &mut errors,
            "taxable_account_balance",
            Some(self.taxable_account_balance),
        );
        if !STANDARD_THRESHOLDS
            .iter()
            .any(|t| (t - self.success_rate_threshold).abs() < 1e-9)
        {
            errors.push(
                "success_rate_threshold",
                "success rate threshold must be 0.90, 0.95, or 0.98",
            );
        }

        errors.into_result()
    }
}

/// Inputs for the required-portfolio (reverse) calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseRequest {
    pub desired_after_tax_income: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    /// Fraction in [0.85, 0.98]
    pub success_rate_threshold: f64,
    #[serde(default)]
    pub current_retirement_account_balance: Option<f64>,
    #[serde(default)]
    pub current_taxable_account_balance: Option<f64>,
    #[serde(default)]
    pub annual_savings: Option<f64>,
    /// When set, only this profile is solved
    #[serde(default)]
    pub preferred_risk_profile: Option<RiskProfile>,
}

impl ReverseRequest {
    /// Whether any current savings figure was supplied
    #[must_use]
    pub fn has_current_savings(&self) -> bool {
        self.current_retirement_account_balance.is_some()
            || self.current_taxable_account_balance.is_some()
    }

    #[must_use]
    pub fn current_total_savings(&self) -> f64 {
        self.current_retirement_account_balance.unwrap_or(0.0)
            + self.current_taxable_account_balance.unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if !(MIN_DESIRED_INCOME..=MAX_DESIRED_INCOME).contains(&self.desired_after_tax_income) {
            errors.push(
                "desired_after_tax_income",
                "desired after-tax annual income must be between $10,000 and $10,000,000",
            );
        }
        check_age(&mut errors, "current_age", self.current_age);
        check_age(&mut errors, "retirement_age", self.retirement_age);
        if self.retirement_age <= self.current_age {
            errors.push(
                "retirement_age",
                "retirement age must be greater than current age",
            );
        }
        if !(MIN_REVERSE_THRESHOLD..=MAX_REVERSE_THRESHOLD).contains(&self.success_rate_threshold)
        {
            errors.push(
                "success_rate_threshold",
                "success rate threshold must be between 0.85 (85%) and 0.98 (98%)",
            );
        }
        check_balance(
            &mut errors,
            "current_retirement_account_balance",
            self.current_retirement_account_balance,
        );
        check_balance(
            &mut errors,
            "current_taxable_account_balance",
            self.current_taxable_account_balance,
        );
        check_balance(&mut errors, "annual_savings", self.annual_savings);

        errors.into_result()
    }
}

fn check_age(errors: &mut ValidationError, field: &'static str, age: u32) {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        errors.push(field, format!("must be between {MIN_AGE} and {MAX_AGE}"));
    }
}

fn check_balance(errors: &mut ValidationError, field: &'static str, amount: Option<f64>) {
    match amount {
        Some(amount) if !(amount.is_finite() && amount >= 0.0) => {
            errors.push(field, "cannot be negative");
        }
        _ => {}
    }
}
