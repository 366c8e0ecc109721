//! Net pay assembly and the final consistency checks.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::error::CalculationError;
use crate::models::CalculationResult;

/// Assembles the final result: `net = gross − social_total − health − pit`.
///
/// # Errors
///
/// [`CalculationError::ComputationInvariantViolation`] if any figure is
/// negative or `net` falls outside `[0, gross]`. Such a result points at a
/// defect in a parameter table or calculator and is never clamped.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::assemble_net_pay;
///
/// let result = assemble_net_pay(
///     dec!(5000.00),
///     dec!(685.50),
///     dec!(388.31),
///     dec!(250.00),
///     dec!(4064),
///     dec!(487.68),
/// )
/// .unwrap();
///
/// assert_eq!(result.net, dec!(3438.51));
/// ```
pub fn assemble_net_pay(
    gross: Decimal,
    social_total: Decimal,
    health: Decimal,
    tax_deductible_costs: Decimal,
    pit_base: Decimal,
    pit: Decimal,
) -> Result<CalculationResult, CalculationError> {
    let net = round_half_up(gross - social_total - health - pit);

    let figures = [
        ("social_total", social_total),
        ("health", health),
        ("tax_deductible_costs", tax_deductible_costs),
        ("pit_base", pit_base),
        ("pit", pit),
    ];
    if let Some((name, value)) = figures.iter().find(|(_, value)| *value < Decimal::ZERO) {
        return Err(CalculationError::ComputationInvariantViolation(format!(
            "{name} is negative: {value}"
        )));
    }

    if net < Decimal::ZERO || net > gross {
        return Err(CalculationError::ComputationInvariantViolation(format!(
            "net {net} outside [0, {gross}] (social {social_total}, health {health}, pit {pit})"
        )));
    }

    debug!(%net, "net pay assembled");

    Ok(CalculationResult {
        social_total,
        health,
        tax_deductible_costs,
        pit_base,
        pit,
        net,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn assemble_subtracts_deductions_from_gross() {
        let result = assemble_net_pay(
            dec!(10000.00),
            dec!(1371.00),
            dec!(776.61),
            dec!(250.00),
            dec!(8379),
            dec!(1005.48),
        )
        .unwrap();

        assert_eq!(result.net, dec!(6846.91));
        assert_eq!(result.pit_base, dec!(8379));
    }

    #[test]
    fn assemble_zero_gross_is_all_zero() {
        let result = assemble_net_pay(
            dec!(0),
            dec!(0),
            dec!(0),
            dec!(0),
            dec!(0),
            dec!(0),
        )
        .unwrap();

        assert_eq!(result, CalculationResult::zero());
    }

    #[test]
    fn assemble_rejects_negative_net() {
        let result = assemble_net_pay(
            dec!(100.00),
            dec!(80.00),
            dec!(30.00),
            dec!(0),
            dec!(0),
            dec!(0),
        );

        assert!(matches!(
            result,
            Err(CalculationError::ComputationInvariantViolation(_))
        ));
    }

    #[test]
    fn assemble_rejects_negative_component() {
        let result = assemble_net_pay(
            dec!(100.00),
            dec!(0),
            dec!(0),
            dec!(0),
            dec!(100),
            dec!(-5.00),
        );

        assert_eq!(
            result,
            Err(CalculationError::ComputationInvariantViolation(
                "pit is negative: -5.00".to_string()
            ))
        );
    }

    #[test]
    fn invariant_violation_is_not_user_correctable() {
        let err = assemble_net_pay(
            dec!(10.00),
            dec!(20.00),
            dec!(0),
            dec!(0),
            dec!(0),
            dec!(0),
        )
        .unwrap_err();

        assert!(!err.is_user_correctable());
    }
}
