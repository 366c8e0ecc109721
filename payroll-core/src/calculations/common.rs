//! Shared rounding and comparison helpers for payroll calculations.
//!
//! Every amount that leaves a calculator passes through one of the two
//! rounding rules defined here, so the whole pipeline rounds the same way.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly half a cent are rounded away from zero, so `0.005`
/// becomes `0.01`. This is the rounding rule for every monetary output of the
/// engine except the taxable base.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(388.304)), dec!(388.30));
/// assert_eq!(round_half_up(dec!(388.305)), dec!(388.31));
/// assert_eq!(round_half_up(dec!(-0.045)), dec!(-0.05)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Drops the fractional part of an amount, rounding toward zero to a whole
/// currency unit.
///
/// Used for the taxable base only.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_down_to_unit;
///
/// assert_eq!(round_down_to_unit(dec!(4064.99)), dec!(4064));
/// assert_eq!(round_down_to_unit(dec!(-12.75)), dec!(-12));
/// ```
pub fn round_down_to_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::ToZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Clamps a value at zero from below.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// `true` when `age` is non-negative and strictly below `ceiling`.
pub fn under_age_ceiling(
    age: i32,
    ceiling: u32,
) -> bool {
    u32::try_from(age).is_ok_and(|age| age < ceiling)
}
