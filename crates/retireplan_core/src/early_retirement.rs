//! Early-withdrawal penalties and the Roth conversion ladder
//!
//! Tax-deferred withdrawals taken before age 59.5 carry a 10% penalty. A
//! conversion ladder avoids it by converting tax-deferred money to a Roth
//! account each year and withdrawing each conversion once it has seasoned for
//! five years, at the cost of paying ordinary income tax on every conversion.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::format::{format_currency, format_currency_whole};
use crate::model::{ConversionYear, PenaltyProfile, RothLadderPlan};
use crate::taxes::ordinary_income_tax;

/// Age at which tax-deferred withdrawals become penalty-free
pub const PENALTY_FREE_AGE: Decimal = dec!(59.5);
pub const PENALTY_RATE: Decimal = dec!(0.10);
/// Years a Roth conversion must wait before its principal can be withdrawn
pub const SEASONING_YEARS: u32 = 5;

#[must_use]
pub fn is_penalty_age(age: u32) -> bool {
    Decimal::from(age) < PENALTY_FREE_AGE
}

#[must_use]
pub fn is_early_retirement(retirement_age: u32) -> bool {
    is_penalty_age(retirement_age)
}

/// Penalty on one year's tax-deferred withdrawal
#[must_use]
pub fn penalty(tax_deferred_withdrawal: Decimal) -> Decimal {
    if tax_deferred_withdrawal <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        tax_deferred_withdrawal * PENALTY_RATE
    }
}

/// Whole years from `retirement_age` until the penalty-free age, rounded up
#[must_use]
pub fn years_until_penalty_free(retirement_age: u32) -> u32 {
    (PENALTY_FREE_AGE - Decimal::from(retirement_age))
        .ceil()
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(0)
}

/// Sum the penalties over a retirement.
///
/// Penalties accrue from the first retirement year and stop for good at the
/// first year whose age reaches 59.5.
#[must_use]
pub fn total_penalties(
    retirement_age: u32,
    duration_years: u32,
    annual_tax_deferred_withdrawal: Decimal,
) -> PenaltyProfile {
    let years_with_penalty = (0..duration_years)
        .take_while(|&year| is_penalty_age(retirement_age + year))
        .count() as u32;
    let total_penalty = penalty(annual_tax_deferred_withdrawal) * Decimal::from(years_with_penalty);
    let per_year_penalty = if years_with_penalty > 0 {
        total_penalty / Decimal::from(years_with_penalty)
    } else {
        Decimal::ZERO
    };

    tracing::debug!(
        retirement_age,
        years_with_penalty,
        %total_penalty,
        "early withdrawal penalties"
    );

    PenaltyProfile {
        total_penalty,
        years_with_penalty,
        per_year_penalty,
        warning: penalty_warning(retirement_age),
        explanation: penalty_explanation(years_with_penalty, total_penalty),
    }
}

/// Warning shown to early retirees; empty at or after the penalty-free age
#[must_use]
pub fn penalty_warning(retirement_age: u32) -> String {
    if !is_early_retirement(retirement_age) {
        return String::new();
    }
    format!(
        "Warning: Retiring at age {retirement_age} means you'll face a 10% early withdrawal penalty \
         on tax-deferred account withdrawals for approximately {} years (until age {PENALTY_FREE_AGE}).",
        years_until_penalty_free(retirement_age)
    )
}

#[must_use]
pub fn penalty_explanation(years_with_penalty: u32, total_penalty: Decimal) -> String {
    if years_with_penalty == 0 {
        return "No early withdrawal penalties apply. You are withdrawing at or after age 59.5."
            .to_string();
    }
    let plural = if years_with_penalty == 1 { "" } else { "s" };
    format!(
        "Early withdrawal penalty: 10% of tax-deferred withdrawals for {years_with_penalty} year{plural}. \
         Total estimated penalties: {}. \
         Strategy: Minimize penalties by withdrawing from taxable accounts first until age 59.5.",
        format_currency(total_penalty)
    )
}

/// Build the conversion schedule: one conversion per pre-59.5 year, plus five
/// trailing years so the last conversions can season.
fn conversion_schedule(
    retirement_age: u32,
    annual_conversion: Decimal,
    years_until_free: u32,
) -> Vec<ConversionYear> {
    let mut schedule: Vec<ConversionYear> = Vec::new();

    for year in 0..years_until_free + SEASONING_YEARS {
        let age = retirement_age + year;
        let (conversion_amount, conversion_tax, mut note) = if is_penalty_age(age) {
            (
                annual_conversion,
                ordinary_income_tax(annual_conversion),
                String::new(),
            )
        } else {
            (
                Decimal::ZERO,
                Decimal::ZERO,
                "No conversion needed - age 59.5+ allows penalty-free withdrawals".to_string(),
            )
        };

        let available_for_withdrawal = if year >= SEASONING_YEARS {
            let source = (year - SEASONING_YEARS) as usize;
            match schedule.get(source) {
                Some(seasoned) => {
                    note = format!(
                        "Can withdraw {} from Year {source} conversion (5-year seasoning complete)",
                        format_currency(seasoned.conversion_amount)
                    );
                    seasoned.conversion_amount
                }
                None => Decimal::ZERO,
            }
        } else {
            note = "Transition year - use taxable accounts or accept penalties if needed".to_string();
            Decimal::ZERO
        };

        tracing::trace!(year, age, %conversion_amount, %conversion_tax, "conversion year");

        schedule.push(ConversionYear {
            year,
            age,
            conversion_amount,
            conversion_tax,
            available_for_withdrawal,
            note,
        });
    }

    schedule
}

/// Compare a conversion ladder against simply paying the penalty.
///
/// The penalty approach costs the penalties plus ordinary tax for every
/// penalized year; the ladder costs the ordinary tax on each conversion. The
/// ladder is recommended when it is strictly cheaper.
#[must_use]
pub fn evaluate_roth_ladder(
    retirement_age: u32,
    annual_tax_deferred_need: Decimal,
    annual_ordinary_tax: Decimal,
    total_penalty: Decimal,
    years_with_penalty: u32,
) -> RothLadderPlan {
    if !is_early_retirement(retirement_age) {
        return RothLadderPlan {
            strategy_explanation: "Roth conversion ladder is not necessary. You are retiring at or \
                                   after age 59.5, so no early withdrawal penalties apply."
                .to_string(),
            ..RothLadderPlan::default()
        };
    }

    let years_until_free = years_until_penalty_free(retirement_age);
    let year_by_year_schedule =
        conversion_schedule(retirement_age, annual_tax_deferred_need, years_until_free);

    let total_conversion_tax_cost: Decimal =
        year_by_year_schedule.iter().map(|y| y.conversion_tax).sum();
    let total_penalty_cost = total_penalty + annual_ordinary_tax * Decimal::from(years_with_penalty);
    let estimated_savings = total_penalty_cost - total_conversion_tax_cost;
    let is_recommended = estimated_savings > Decimal::ZERO;

    let mut plan = RothLadderPlan {
        is_recommended,
        total_conversion_tax_cost,
        total_penalty_cost,
        estimated_savings,
        requires_immediate_funds: years_until_free >= SEASONING_YEARS,
        year_by_year_schedule,
        strategy_explanation: String::new(),
        transition_warning: transition_warning(retirement_age, years_until_free),
    };
    plan.strategy_explanation = strategy_explanation(&plan, years_until_free);

    tracing::info!(
        retirement_age,
        is_recommended,
        %estimated_savings,
        %total_conversion_tax_cost,
        %total_penalty_cost,
        "roth conversion ladder evaluated"
    );

    plan
}

fn strategy_explanation(plan: &RothLadderPlan, years_until_free: u32) -> String {
    if !plan.is_recommended {
        return format!(
            "The Roth conversion ladder strategy would cost {} in conversion taxes, compared to {} \
             using the standard penalty approach. The penalty approach is more cost-effective by {}.",
            format_currency(plan.total_conversion_tax_cost),
            format_currency(plan.total_penalty_cost),
            format_currency(plan.estimated_savings.abs()),
        );
    }

    format!(
        "Roth Conversion Ladder Recommended: By converting traditional IRA/401(k) funds to a Roth IRA \
         each year and waiting 5 years for each conversion to season, you can avoid the 10% early \
         withdrawal penalty.\n\nEstimated savings: {} ({} penalty approach vs {} conversion approach).\
         \n\nYou would need to perform Roth conversions for {years_until_free} years (until age 59.5), \
         paying ordinary income tax on each conversion in the year it occurs.",
        format_currency_whole(plan.estimated_savings),
        format_currency_whole(plan.total_penalty_cost),
        format_currency_whole(plan.total_conversion_tax_cost),
    )
}

fn transition_warning(retirement_age: u32, years_until_free: u32) -> String {
    if years_until_free < SEASONING_YEARS {
        return format!(
            "Since you only have {years_until_free} years until age 59.5, you can start conversions \
             immediately and they'll be available before you reach the penalty-free age."
        );
    }

    let transition_end_age = retirement_age + SEASONING_YEARS;
    format!(
        "First {SEASONING_YEARS} Years Transition Period: Roth conversions require a 5-year seasoning \
         period before you can withdraw the converted principal penalty-free.\n\nFor the first 5 years \
         of retirement (age {retirement_age} to {transition_end_age}), you'll need to fund your expenses \
         using:\n- Taxable account withdrawals (recommended)\n- Roth IRA contributions (if you made any, \
         always penalty-free)\n- A mix of small penalty withdrawals if necessary\n\nStart converting to \
         Roth IRA immediately upon retirement to begin the 5-year clock."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_age_boundary() {
        assert!(is_penalty_age(59));
        assert!(!is_penalty_age(60));
        assert!(is_early_retirement(50));
        assert!(!is_early_retirement(65));
    }

    #[test]
    fn test_years_until_penalty_free() {
        assert_eq!(years_until_penalty_free(50), 10);
        assert_eq!(years_until_penalty_free(55), 5);
        assert_eq!(years_until_penalty_free(59), 1);
        assert_eq!(years_until_penalty_free(60), 0);
        assert_eq!(years_until_penalty_free(70), 0);
    }

    #[test]
    fn test_retire_at_fifty_pays_ten_years() {
        let profile = total_penalties(50, 45, dec!(40000));
        assert_eq!(profile.years_with_penalty, 10);
        assert_eq!(profile.total_penalty, dec!(40000));
        assert_eq!(profile.per_year_penalty, dec!(4000));
        assert!(profile.warning.contains("approximately 10 years"));
        assert!(profile.explanation.contains("10 years"));
    }

    #[test]
    fn test_penalties_limited_by_duration() {
        let profile = total_penalties(50, 3, dec!(10000));
        assert_eq!(profile.years_with_penalty, 3);
        assert_eq!(profile.total_penalty, dec!(3000));
    }

    #[test]
    fn test_no_penalty_after_threshold() {
        let profile = total_penalties(60, 35, dec!(50000));
        assert_eq!(profile.years_with_penalty, 0);
        assert_eq!(profile.total_penalty, Decimal::ZERO);
        assert_eq!(profile.per_year_penalty, Decimal::ZERO);
        assert!(profile.warning.is_empty());
    }

    #[test]
    fn test_zero_withdrawal_has_zero_penalty() {
        assert_eq!(penalty(Decimal::ZERO), Decimal::ZERO);
        assert_eq!(penalty(dec!(-5)), Decimal::ZERO);
        assert_eq!(total_penalties(50, 45, Decimal::ZERO).total_penalty, Decimal::ZERO);
    }

    #[test]
    fn test_ladder_not_needed_after_threshold() {
        let plan = evaluate_roth_ladder(62, dec!(50000), dec!(4000), Decimal::ZERO, 0);
        assert!(!plan.is_recommended);
        assert!(plan.year_by_year_schedule.is_empty());
        assert!(plan.strategy_explanation.contains("not necessary"));
    }

    #[test]
    fn test_ladder_schedule_shape() {
        let need = dec!(40000);
        let plan = evaluate_roth_ladder(50, need, ordinary_income_tax(need), dec!(40000), 10);

        assert_eq!(plan.year_by_year_schedule.len(), 15);
        assert!(plan.requires_immediate_funds);

        let schedule = &plan.year_by_year_schedule;
        // Ages 50 through 59 convert; 60 onward do not
        assert!(schedule[..10].iter().all(|y| y.conversion_amount == need));
        assert!(schedule[10..].iter().all(|y| y.conversion_amount.is_zero()));
        // Nothing seasoned in the first five years
        assert!(schedule[..5].iter().all(|y| y.available_for_withdrawal.is_zero()));
        // Year 5 draws on year 0, year 14 draws on year 9
        assert_eq!(schedule[5].available_for_withdrawal, need);
        assert_eq!(schedule[14].available_for_withdrawal, need);
        assert!(schedule[14].note.contains("Year 9"));
    }

    #[test]
    fn test_ladder_recommended_when_cheaper() {
        let need = dec!(40000);
        let tax = ordinary_income_tax(need);
        let plan = evaluate_roth_ladder(50, need, tax, dec!(40000), 10);

        // Both approaches pay the same ordinary tax for ten years; the penalty tips it
        assert_eq!(plan.total_conversion_tax_cost, tax * dec!(10));
        assert_eq!(plan.total_penalty_cost, dec!(40000) + tax * dec!(10));
        assert_eq!(plan.estimated_savings, dec!(40000));
        assert!(plan.is_recommended);
        assert!(plan.strategy_explanation.starts_with("Roth Conversion Ladder Recommended"));
    }

    #[test]
    fn test_ladder_rejected_when_penalty_cheaper() {
        let need = dec!(40000);
        let plan = evaluate_roth_ladder(50, need, Decimal::ZERO, dec!(1000), 10);
        assert!(!plan.is_recommended);
        assert!(plan.estimated_savings < Decimal::ZERO);
        assert!(plan.strategy_explanation.contains("more cost-effective"));
    }

    #[test]
    fn test_short_runway_does_not_require_immediate_funds() {
        let plan = evaluate_roth_ladder(57, dec!(30000), dec!(2000), dec!(9000), 3);
        assert!(!plan.requires_immediate_funds);
        assert_eq!(plan.year_by_year_schedule.len(), 8);
        assert!(plan.transition_warning.contains("only have 3 years"));
    }
}
