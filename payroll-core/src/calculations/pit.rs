//! Personal income tax (PIT).
//!
//! Relief eligibility is decided once per call and is terminal:
//!
//! - `Exempt(YouthRelief)`: relief claimed, the contract allows it, and the
//!   applicant is under the youth-relief age ceiling.
//! - `Exempt(Student)`: a student under the student age ceiling on a
//!   contract that exempts students from PIT.
//! - `Taxable`: otherwise. The tax-free amount is subtracted from the base
//!   (floored at zero) and each bracket taxes the slice of the base that
//!   falls within it at its marginal rate.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::{PitCalculator, PitState};
//! use payroll_core::params::builtin::poland_2025;
//!
//! let params = poland_2025();
//! let calculator = PitCalculator::new(&params);
//!
//! // 120000 × 12% + 30000 × 32%
//! assert_eq!(calculator.calculate(dec!(150000), PitState::Taxable), dec!(24000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up, under_age_ceiling};
use crate::error::ValidationError;
use crate::models::{CalculationInput, MAX_AGE, TaxParameters};

/// Why a calculation pays no PIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionReason {
    YouthRelief,
    Student,
}

/// Relief state of one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum PitState {
    Exempt(ExemptionReason),
    Taxable,
}

/// Rejects ages outside `0..=MAX_AGE`.
pub fn validate_age(age: i32) -> Result<(), ValidationError> {
    if !(0..=MAX_AGE).contains(&age) {
        return Err(ValidationError::InvalidAge { age, max: MAX_AGE });
    }
    Ok(())
}

/// Calculator for personal income tax.
#[derive(Debug, Clone)]
pub struct PitCalculator<'a> {
    params: &'a TaxParameters,
}

impl<'a> PitCalculator<'a> {
    pub fn new(params: &'a TaxParameters) -> Self {
        Self { params }
    }

    /// Decides whether the request is exempt from PIT.
    ///
    /// Youth relief is checked before the student exemption.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidAge`] if the age is negative or too high
    /// - [`ValidationError::InvalidContract`] if the table has no rules for
    ///   the contract
    pub fn relief_state(
        &self,
        input: &CalculationInput,
    ) -> Result<PitState, ValidationError> {
        validate_age(input.age)?;
        let rules = self.params.require_rules(input.contract)?;

        let state = if input.youth_tax_relief
            && under_age_ceiling(input.age, self.params.youth_relief_age_ceiling)
        {
            PitState::Exempt(ExemptionReason::YouthRelief)
        } else if input.is_student
            && rules.student_exempt_pit
            && under_age_ceiling(input.age, self.params.student_age_ceiling)
        {
            PitState::Exempt(ExemptionReason::Student)
        } else {
            PitState::Taxable
        };

        debug!(?state, contract = %input.contract, age = input.age, "PIT relief state");
        Ok(state)
    }

    /// PIT on a whole-unit taxable base, rounded half-up to the cent.
    pub fn calculate(
        &self,
        pit_base: Decimal,
        state: PitState,
    ) -> Decimal {
        match state {
            PitState::Exempt(_) => Decimal::ZERO,
            PitState::Taxable => {
                let taxable = non_negative(pit_base - self.params.tax_free_amount);
                round_half_up(self.progressive_tax(taxable))
            }
        }
    }

    /// Unrounded tax on `taxable` across all brackets.
    fn progressive_tax(
        &self,
        taxable: Decimal,
    ) -> Decimal {
        let mut tax = Decimal::ZERO;
        for bracket in &self.params.pit_brackets {
            if taxable <= bracket.lower {
                break;
            }
            let top = bracket.upper.map_or(taxable, |upper| min(upper, taxable));
            tax += (top - bracket.lower) * bracket.rate;
        }
        tax
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ContractType, PitBracket};
    use crate::params::builtin::poland_2025;

    fn input(
        contract: ContractType,
        age: i32,
    ) -> CalculationInput {
        CalculationInput {
            age,
            ..CalculationInput::new(dec!(5000.00), contract)
        }
    }

    // =========================================================================
    // relief_state tests
    // =========================================================================

    #[test]
    fn relief_state_youth_relief_under_ceiling_is_exempt() {
        let params = poland_2025();
        let request = CalculationInput {
            youth_tax_relief: true,
            ..input(ContractType::Employment, 20)
        };

        let state = PitCalculator::new(&params).relief_state(&request).unwrap();

        assert_eq!(state, PitState::Exempt(ExemptionReason::YouthRelief));
    }

    #[test]
    fn relief_state_youth_relief_at_ceiling_is_taxable() {
        let params = poland_2025();
        let request = CalculationInput {
            youth_tax_relief: true,
            ..input(ContractType::Employment, 26)
        };

        let state = PitCalculator::new(&params).relief_state(&request).unwrap();

        assert_eq!(state, PitState::Taxable);
    }

    #[test]
    fn relief_state_youth_relief_unclaimed_is_taxable() {
        let params = poland_2025();

        let state = PitCalculator::new(&params)
            .relief_state(&input(ContractType::Employment, 20))
            .unwrap();

        assert_eq!(state, PitState::Taxable);
    }

    #[test]
    fn relief_state_youth_relief_applies_to_every_contract() {
        let params = poland_2025();

        for contract in ContractType::ALL {
            let request = CalculationInput {
                youth_tax_relief: true,
                ..input(contract, 20)
            };

            let state = PitCalculator::new(&params).relief_state(&request).unwrap();

            assert_eq!(
                state,
                PitState::Exempt(ExemptionReason::YouthRelief),
                "{contract}"
            );
        }
    }

    #[test]
    fn relief_state_student_on_mandate_is_exempt() {
        let params = poland_2025();
        let request = CalculationInput {
            is_student: true,
            ..input(ContractType::Mandate, 21)
        };

        let state = PitCalculator::new(&params).relief_state(&request).unwrap();

        assert_eq!(state, PitState::Exempt(ExemptionReason::Student));
    }

    #[test]
    fn relief_state_student_on_employment_is_taxable() {
        let params = poland_2025();
        let request = CalculationInput {
            is_student: true,
            ..input(ContractType::Employment, 21)
        };

        let state = PitCalculator::new(&params).relief_state(&request).unwrap();

        assert_eq!(state, PitState::Taxable);
    }

    #[test]
    fn relief_state_prefers_youth_relief_reason() {
        let params = poland_2025();
        let request = CalculationInput {
            is_student: true,
            youth_tax_relief: true,
            ..input(ContractType::Mandate, 21)
        };

        let state = PitCalculator::new(&params).relief_state(&request).unwrap();

        assert_eq!(state, PitState::Exempt(ExemptionReason::YouthRelief));
    }

    #[test]
    fn relief_state_rejects_negative_age() {
        let params = poland_2025();

        let result = PitCalculator::new(&params).relief_state(&input(ContractType::Employment, -1));

        assert_eq!(
            result,
            Err(ValidationError::InvalidAge { age: -1, max: MAX_AGE })
        );
    }

    #[test]
    fn validate_age_accepts_bounds_and_rejects_above_max() {
        assert_eq!(validate_age(0), Ok(()));
        assert_eq!(validate_age(MAX_AGE), Ok(()));
        assert!(validate_age(MAX_AGE + 1).is_err());
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_first_bracket_only() {
        let params = poland_2025();

        let pit = PitCalculator::new(&params).calculate(dec!(4064), PitState::Taxable);

        assert_eq!(pit, dec!(487.68));
    }

    #[test]
    fn calculate_spans_two_brackets() {
        let params = poland_2025();

        let pit = PitCalculator::new(&params).calculate(dec!(263102), PitState::Taxable);

        assert_eq!(pit, dec!(60192.64));
    }

    #[test]
    fn calculate_exactly_at_bracket_edge() {
        let params = poland_2025();

        let pit = PitCalculator::new(&params).calculate(dec!(120000), PitState::Taxable);

        assert_eq!(pit, dec!(14400.00));
    }

    #[test]
    fn calculate_exempt_is_zero() {
        let params = poland_2025();

        let pit = PitCalculator::new(&params).calculate(
            dec!(50000),
            PitState::Exempt(ExemptionReason::YouthRelief),
        );

        assert_eq!(pit, dec!(0));
    }

    #[test]
    fn calculate_subtracts_tax_free_amount_first() {
        let params = TaxParameters {
            tax_free_amount: dec!(1000),
            ..poland_2025()
        };

        let pit = PitCalculator::new(&params).calculate(dec!(4064), PitState::Taxable);

        assert_eq!(pit, dec!(367.68));
    }

    #[test]
    fn calculate_base_below_tax_free_amount_is_zero() {
        let params = TaxParameters {
            tax_free_amount: dec!(5000),
            ..poland_2025()
        };

        let pit = PitCalculator::new(&params).calculate(dec!(4064), PitState::Taxable);

        assert_eq!(pit, dec!(0));
    }

    #[test]
    fn calculate_rounds_fractional_cents_half_up() {
        let params = TaxParameters {
            pit_brackets: vec![PitBracket {
                lower: dec!(0),
                upper: None,
                rate: dec!(0.175),
            }],
            ..poland_2025()
        };

        // 3 × 17.5% = 0.525
        let pit = PitCalculator::new(&params).calculate(dec!(3), PitState::Taxable);

        assert_eq!(pit, dec!(0.53));
    }

    #[test]
    fn calculate_zero_base_is_zero() {
        let params = poland_2025();

        let pit = PitCalculator::new(&params).calculate(dec!(0), PitState::Taxable);

        assert_eq!(pit, dec!(0));
    }
}
