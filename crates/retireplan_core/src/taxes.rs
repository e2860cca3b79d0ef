//! Federal income tax on retirement withdrawals
//!
//! Tax-deferred withdrawals are taxed as ordinary income through progressive
//! brackets after the standard deduction. Taxable-account withdrawals are
//! treated as long-term capital gains stacked on top of that ordinary income.
//! All amounts are [`Decimal`] and results are rounded to cents.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal_macros::dec;
use serde::Serialize;

/// A marginal rate applying up to `upper_limit` (unbounded when `None`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBracket {
    pub upper_limit: Option<Decimal>,
    pub rate: Decimal,
}

/// One filing year's policy table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxSchedule {
    pub year: i32,
    pub standard_deduction: Decimal,
    pub ordinary_brackets: &'static [TaxBracket],
    pub capital_gains_brackets: &'static [TaxBracket],
}

const fn bracket(upper_limit: Decimal, rate: Decimal) -> TaxBracket {
    TaxBracket {
        upper_limit: Some(upper_limit),
        rate,
    }
}

const fn top_bracket(rate: Decimal) -> TaxBracket {
    TaxBracket {
        upper_limit: None,
        rate,
    }
}

const ORDINARY_SINGLE_2025: [TaxBracket; 7] = [
    bracket(dec!(11925), dec!(0.10)),
    bracket(dec!(48475), dec!(0.12)),
    bracket(dec!(103350), dec!(0.22)),
    bracket(dec!(197300), dec!(0.24)),
    bracket(dec!(250525), dec!(0.32)),
    bracket(dec!(626350), dec!(0.35)),
    top_bracket(dec!(0.37)),
];

const CAPITAL_GAINS_SINGLE_2025: [TaxBracket; 3] = [
    bracket(dec!(48350), dec!(0.00)),
    bracket(dec!(533400), dec!(0.15)),
    top_bracket(dec!(0.20)),
];

impl TaxSchedule {
    /// 2025 federal schedule for single filers
    pub const SINGLE_2025: TaxSchedule = TaxSchedule {
        year: 2025,
        standard_deduction: dec!(15000),
        ordinary_brackets: &ORDINARY_SINGLE_2025,
        capital_gains_brackets: &CAPITAL_GAINS_SINGLE_2025,
    };

    /// Income remaining after the standard deduction, floored at zero
    #[must_use]
    pub fn taxable_ordinary_income(&self, income: Decimal) -> Decimal {
        (income - self.standard_deduction).max(Decimal::ZERO)
    }

    /// Upper limit of the 12% ordinary bracket
    #[must_use]
    pub fn top_of_12_percent_bracket(&self) -> Decimal {
        self.ordinary_brackets
            .iter()
            .find(|b| b.rate == dec!(0.12))
            .and_then(|b| b.upper_limit)
            .unwrap_or(Decimal::ZERO)
    }

    /// Progressive tax on ordinary income, after the standard deduction
    #[must_use]
    pub fn ordinary_income_tax(&self, income: Decimal) -> Decimal {
        let taxable = self.taxable_ordinary_income(income);
        let tax = tax_in_bands(self.ordinary_brackets, Decimal::ZERO, taxable);
        tracing::trace!(%income, %taxable, %tax, "ordinary income tax");
        round_cents(tax)
    }

    /// Tax on long-term gains stacked on top of deducted ordinary income.
    ///
    /// Each slice of the gains is taxed at the rate of the band it lands in,
    /// so a stack that straddles a threshold is split across both rates.
    #[must_use]
    pub fn long_term_capital_gains_tax(&self, gains: Decimal, ordinary_income: Decimal) -> Decimal {
        if gains <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let base = self.taxable_ordinary_income(ordinary_income);
        let tax = tax_in_bands(self.capital_gains_brackets, base, base + gains);
        tracing::trace!(%gains, %ordinary_income, %tax, "long-term capital gains tax");
        round_cents(tax)
    }

    /// Ordinary tax on the tax-deferred draw plus gains tax on the taxable draw
    #[must_use]
    pub fn total_tax(&self, taxable_withdrawal: Decimal, tax_deferred_withdrawal: Decimal) -> Decimal {
        self.ordinary_income_tax(tax_deferred_withdrawal)
            + self.long_term_capital_gains_tax(taxable_withdrawal, tax_deferred_withdrawal)
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::SINGLE_2025
    }
}

/// Tax owed on the income slice `(from, to]` across consecutive bands
fn tax_in_bands(brackets: &[TaxBracket], from: Decimal, to: Decimal) -> Decimal {
    if to <= from {
        return Decimal::ZERO;
    }

    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        let upper = bracket.upper_limit.unwrap_or(Decimal::MAX);
        let portion = to.min(upper) - from.max(lower);
        if portion > Decimal::ZERO {
            tax += portion * bracket.rate;
        }
        if to <= upper {
            break;
        }
        lower = upper;
    }

    tax
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}

/// Standard deduction of the default schedule
#[must_use]
pub fn standard_deduction() -> Decimal {
    TaxSchedule::SINGLE_2025.standard_deduction
}

#[must_use]
pub fn ordinary_income_tax(income: Decimal) -> Decimal {
    TaxSchedule::SINGLE_2025.ordinary_income_tax(income)
}

#[must_use]
pub fn long_term_capital_gains_tax(gains: Decimal, ordinary_income: Decimal) -> Decimal {
    TaxSchedule::SINGLE_2025.long_term_capital_gains_tax(gains, ordinary_income)
}

#[must_use]
pub fn total_tax(taxable_withdrawal: Decimal, tax_deferred_withdrawal: Decimal) -> Decimal {
    TaxSchedule::SINGLE_2025.total_tax(taxable_withdrawal, tax_deferred_withdrawal)
}

/// Convert a simulated dollar amount into money, rounded to cents.
/// Non-finite input maps to zero.
#[must_use]
pub fn to_money(amount: f64) -> Decimal {
    Decimal::from_f64(amount).map_or(Decimal::ZERO, round_cents)
}

#[must_use]
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}
