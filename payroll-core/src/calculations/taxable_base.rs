//! Taxable (PIT) base.

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_down_to_unit};

/// `gross − social_total − costs`, rounded toward zero to a whole currency
/// unit and clamped at zero.
///
/// Every downstream tax figure is computed from this whole-unit value, so the
/// truncation must happen here and nowhere else.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::taxable_base;
///
/// assert_eq!(taxable_base(dec!(5000.00), dec!(685.50), dec!(250.00)), dec!(4064));
/// ```
pub fn taxable_base(
    gross: Decimal,
    social_total: Decimal,
    tax_deductible_costs: Decimal,
) -> Decimal {
    non_negative(round_down_to_unit(gross - social_total - tax_deductible_costs))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn taxable_base_truncates_fraction() {
        let base = taxable_base(dec!(8000.00), dec!(1096.80), dec!(1380.64));

        assert_eq!(base, dec!(5522));
    }

    #[test]
    fn taxable_base_does_not_round_up_at_ninety_nine_cents() {
        let base = taxable_base(dec!(1000.99), dec!(0), dec!(0));

        assert_eq!(base, dec!(1000));
    }

    #[test]
    fn taxable_base_keeps_whole_amounts() {
        let base = taxable_base(dec!(7000.00), dec!(0), dec!(1400.00));

        assert_eq!(base, dec!(5600));
    }

    #[test]
    fn taxable_base_is_never_negative() {
        let base = taxable_base(dec!(100.00), dec!(13.71), dec!(250.00));

        assert_eq!(base, dec!(0));
    }
}
