//! Tax-optimized sourcing of a year's withdrawal
//!
//! Tax-deferred money is drawn first up to the point where it fills the
//! standard deduction and the 12% bracket, the remainder comes from the
//! taxable account (taxed as long-term gains), and any shortfall there goes
//! back to tax-deferred.

use rust_decimal::Decimal;

use crate::model::WithdrawalPlan;
use crate::taxes::TaxSchedule;

/// `(taxable, tax_deferred)` amounts for a withdrawal of `need`
#[must_use]
pub fn split_withdrawal(
    schedule: &TaxSchedule,
    need: Decimal,
    taxable_balance: Decimal,
    tax_deferred_balance: Decimal,
) -> (Decimal, Decimal) {
    if tax_deferred_balance <= Decimal::ZERO {
        return (need, Decimal::ZERO);
    }
    if taxable_balance <= Decimal::ZERO {
        return (Decimal::ZERO, need);
    }

    let low_bracket_room = schedule.standard_deduction + schedule.top_of_12_percent_bracket();
    let preferred_tax_deferred = low_bracket_room.min(need).min(tax_deferred_balance);
    let taxable = (need - preferred_tax_deferred).min(taxable_balance);
    let tax_deferred = need - taxable;

    (taxable, tax_deferred)
}

/// Split a withdrawal and compute the tax owed on each source
#[must_use]
pub fn plan_withdrawal(
    schedule: &TaxSchedule,
    gross: Decimal,
    taxable_balance: Decimal,
    tax_deferred_balance: Decimal,
) -> WithdrawalPlan {
    let (taxable, tax_deferred) =
        split_withdrawal(schedule, gross, taxable_balance, tax_deferred_balance);
    let ordinary_income_tax = schedule.ordinary_income_tax(tax_deferred);
    let capital_gains_tax = schedule.long_term_capital_gains_tax(taxable, tax_deferred);

    WithdrawalPlan {
        gross_annual_withdrawal: gross,
        taxable_source_amount: taxable,
        tax_deferred_source_amount: tax_deferred,
        ordinary_income_tax,
        capital_gains_tax,
        effective_tax_rate_pct: effective_rate_pct(ordinary_income_tax + capital_gains_tax, gross),
    }
}

/// `tax / gross` in percent, rounded to two places; zero for a zero gross
#[must_use]
pub fn effective_rate_pct(tax: Decimal, gross: Decimal) -> Decimal {
    if gross > Decimal::ZERO {
        (tax / gross * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    }
}
