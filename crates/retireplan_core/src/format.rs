//! Currency formatting for report text

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// `$1,234.50` style, two decimal places
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let dollars = rounded.trunc();
    let cents = ((rounded - dollars) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or(0);
    let dollars = dollars.to_u128().unwrap_or(0);
    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${}.{cents:02}", group_thousands(&dollars.to_string()))
}

/// `$1,235` style, rounded to whole dollars
#[must_use]
pub fn format_currency_whole(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let dollars = rounded.to_u128().unwrap_or(0);
    format!("{sign}${}", group_thousands(&dollars.to_string()))
}
