//! The calculation pipeline.
//!
//! A [`PayrollEngine`] validates a request once, picks the parameter table for
//! its tax period, and runs the stages in dependency order:
//!
//! | Stage | Calculator | Produces |
//! |-------|------------|----------|
//! | 1 | [`ContributionCalculator`] | `social_total` |
//! | 2 | [`HealthCalculator`] | `health` |
//! | 3 | [`DeductibleCostsCalculator`] | `tax_deductible_costs` |
//! | 4 | [`taxable_base`] | `pit_base` |
//! | 5 | [`PitCalculator`] | `pit` |
//! | 6 | [`assemble_net_pay`] | `net` |
//!
//! Every stage reads the input, the table, and the outputs of earlier stages.
//! Nothing is shared between calls except the read-only registry, so one
//! engine can serve any number of threads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::contributions::{
    ComponentContribution, ContributionCalculator, InsuranceStatus,
};
use crate::calculations::deductible_costs::{
    CostMode, DeductibleCostsCalculator, validate_overrides,
};
use crate::calculations::health::HealthCalculator;
use crate::calculations::net_pay::assemble_net_pay;
use crate::calculations::pit::{PitCalculator, PitState, validate_age};
use crate::calculations::taxable_base::taxable_base;
use crate::error::{CalculationError, ValidationError};
use crate::models::{CalculationInput, CalculationResult, TaxPeriod};
use crate::params::ParameterRegistry;
use crate::params::builtin::LATEST_BUILTIN_YEAR;

/// How a result was reached, for auditing and for advancing a
/// [`YearToDateAccumulator`](crate::models::YearToDateAccumulator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub period: TaxPeriod,
    pub parameters_version: String,
    pub insurance: InsuranceStatus,
    pub social_components: Vec<ComponentContribution>,
    /// Base counted against the annual contribution cap by this call.
    pub capped_contribution_base: Decimal,
    pub cost_mode: CostMode,
    /// Costs counted against the creative ceiling by this call.
    pub creative_costs: Decimal,
    pub pit_state: PitState,
}

/// A result together with its breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calculation {
    pub result: CalculationResult,
    pub breakdown: CalculationBreakdown,
}

/// Checks the request fields that do not depend on a parameter table.
///
/// # Errors
///
/// - [`ValidationError::InvalidGross`] for a negative gross or one with more
///   than two decimal places
/// - [`ValidationError::InvalidAge`] for an age outside `0..=MAX_AGE`
/// - [`ValidationError::InvalidOverride`] for an out-of-range cost override
/// - [`ValidationError::InvalidYearToDate`] for a negative year-to-date total
pub fn validate_input(input: &CalculationInput) -> Result<(), ValidationError> {
    if input.gross < Decimal::ZERO || input.gross.round_dp(2) != input.gross {
        return Err(ValidationError::InvalidGross(input.gross));
    }
    validate_age(input.age)?;
    validate_overrides(input)?;

    if let Some(ytd) = &input.year_to_date {
        if ytd.contribution_base < Decimal::ZERO {
            return Err(ValidationError::InvalidYearToDate {
                field: "contribution_base",
                value: ytd.contribution_base,
            });
        }
        if ytd.creative_costs < Decimal::ZERO {
            return Err(ValidationError::InvalidYearToDate {
                field: "creative_costs",
                value: ytd.creative_costs,
            });
        }
    }

    Ok(())
}

/// Prices requests against the tables in a [`ParameterRegistry`].
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::{CalculationInput, ContractType, PayrollEngine};
///
/// let engine = PayrollEngine::builtin();
/// let input = CalculationInput::new(dec!(5000.00), ContractType::Employment);
///
/// let result = engine.calculate(&input).unwrap();
///
/// assert_eq!(result.net, dec!(3438.51));
/// assert_eq!(
///     result.net + result.social_total + result.health + result.pit,
///     input.gross
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PayrollEngine {
    registry: ParameterRegistry,
    default_period: TaxPeriod,
}

impl PayrollEngine {
    /// Engine over `registry`, pricing requests without a period against
    /// `default_period`.
    pub fn new(
        registry: ParameterRegistry,
        default_period: TaxPeriod,
    ) -> Self {
        Self {
            registry,
            default_period,
        }
    }

    /// Engine over the built-in tables, defaulting to the newest one.
    pub fn builtin() -> Self {
        Self::new(
            ParameterRegistry::builtin(),
            TaxPeriod::new(LATEST_BUILTIN_YEAR),
        )
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn default_period(&self) -> TaxPeriod {
        self.default_period
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// - [`CalculationError::Validation`] for input the caller must fix
    /// - [`CalculationError::UnsupportedPeriod`] if no table covers the
    ///   requested period
    /// - [`CalculationError::ComputationInvariantViolation`] if the assembled
    ///   result is inconsistent
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        self.calculate_detailed(input)
            .map(|calculation| calculation.result)
    }

    /// Like [`calculate`](Self::calculate), also returning the breakdown.
    pub fn calculate_detailed(
        &self,
        input: &CalculationInput,
    ) -> Result<Calculation, CalculationError> {
        validate_input(input)?;

        let period = input.period.unwrap_or(self.default_period);
        let params = self.registry.parameters_for(period)?;
        let rules = params.require_rules(input.contract)?;

        debug!(
            %period,
            version = %params.version,
            contract = %input.contract,
            gross = %input.gross,
            "starting payroll calculation"
        );

        let insurance = InsuranceStatus::resolve(input, rules, params);
        let contributions = ContributionCalculator::new(params).calculate(
            input.gross,
            input.contract,
            insurance,
            input.year_to_date.as_ref(),
        )?;
        let social_total = contributions.social_total;

        let health = HealthCalculator::new(params).calculate(
            input.gross,
            social_total,
            input.contract,
            insurance,
        )?;

        let costs = DeductibleCostsCalculator::new(params).calculate(input, social_total)?;

        let pit_base = taxable_base(input.gross, social_total, costs.amount);

        let pit_calculator = PitCalculator::new(params);
        let pit_state = pit_calculator.relief_state(input)?;
        let pit = pit_calculator.calculate(pit_base, pit_state);

        let result = assemble_net_pay(
            input.gross,
            social_total,
            health,
            costs.amount,
            pit_base,
            pit,
        )?;

        Ok(Calculation {
            result,
            breakdown: CalculationBreakdown {
                period,
                parameters_version: params.version.clone(),
                insurance,
                social_components: contributions.components,
                capped_contribution_base: contributions.capped_base,
                cost_mode: costs.mode,
                creative_costs: costs.creative_costs,
                pit_state,
            },
        })
    }
}

/// Prices one request against the built-in tables.
pub fn calculate(input: &CalculationInput) -> Result<CalculationResult, CalculationError> {
    PayrollEngine::builtin().calculate(input)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::pit::ExemptionReason;
    use crate::models::{ContractType, YearToDateAccumulator};

    fn employment(gross: Decimal) -> CalculationInput {
        CalculationInput::new(gross, ContractType::Employment)
    }

    fn expected(
        social_total: Decimal,
        health: Decimal,
        tax_deductible_costs: Decimal,
        pit_base: Decimal,
        pit: Decimal,
        net: Decimal,
    ) -> CalculationResult {
        CalculationResult {
            social_total,
            health,
            tax_deductible_costs,
            pit_base,
            pit,
            net,
        }
    }

    // =========================================================================
    // Scenario tests
    // =========================================================================

    #[test]
    fn employment_standard_5000() {
        let result = calculate(&employment(dec!(5000.00))).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(685.50),
                dec!(388.31),
                dec!(250.00),
                dec!(4064),
                dec!(487.68),
                dec!(3438.51)
            )
        );
    }

    #[test]
    fn employment_standard_10000() {
        let result = calculate(&employment(dec!(10000.00))).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(1371.00),
                dec!(776.61),
                dec!(250.00),
                dec!(8379),
                dec!(1005.48),
                dec!(6846.91)
            )
        );
    }

    #[test]
    fn employment_above_contribution_cap() {
        let result = calculate(&employment(dec!(300000.00))).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(36647.39),
                dec!(23701.73),
                dec!(250.00),
                dec!(263102),
                dec!(60192.64),
                dec!(179458.24)
            )
        );
    }

    #[test]
    fn mandate_default_costs_are_rate_of_income() {
        let input = CalculationInput::new(dec!(8000.00), ContractType::Mandate);

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(1096.80),
                dec!(621.29),
                dec!(1380.64),
                dec!(5522),
                dec!(662.64),
                dec!(5619.27)
            )
        );
    }

    #[test]
    fn mandate_student_pays_nothing() {
        let input = CalculationInput {
            age: 21,
            is_student: true,
            ..CalculationInput::new(dec!(4000.00), ContractType::Mandate)
        };

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(0),
                dec!(0),
                dec!(800.00),
                dec!(3200),
                dec!(0),
                dec!(4000.00)
            )
        );
    }

    #[test]
    fn mandate_opted_out_of_insurance() {
        let input = CalculationInput {
            voluntary_insurance: false,
            ..CalculationInput::new(dec!(6000.00), ContractType::Mandate)
        };

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(0),
                dec!(0),
                dec!(1200.00),
                dec!(4800),
                dec!(576.00),
                dec!(5424.00)
            )
        );
    }

    #[test]
    fn work_contract_has_no_contributions() {
        let input = CalculationInput::new(dec!(7000.00), ContractType::Work);

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(0),
                dec!(0),
                dec!(1400.00),
                dec!(5600),
                dec!(672.00),
                dec!(6328.00)
            )
        );
    }

    #[test]
    fn work_contract_creative_costs() {
        let input = CalculationInput {
            creative_50: true,
            ..CalculationInput::new(dec!(7000.00), ContractType::Work)
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.tax_deductible_costs, dec!(3500.00));
        assert_eq!(result.pit, dec!(420.00));
        assert_eq!(result.net, dec!(6580.00));
    }

    #[test]
    fn youth_relief_zeroes_pit_only() {
        let input = CalculationInput {
            age: 22,
            youth_tax_relief: true,
            ..employment(dec!(6000.00))
        };

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(822.60),
                dec!(465.97),
                dec!(250.00),
                dec!(4927),
                dec!(0),
                dec!(4711.43)
            )
        );
    }

    #[test]
    fn youth_relief_on_work_contract_leaves_gross_untaxed() {
        let input = CalculationInput {
            age: 20,
            youth_tax_relief: true,
            ..CalculationInput::new(dec!(5000.00), ContractType::Work)
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.pit, dec!(0));
        assert_eq!(result.net, dec!(5000.00));
    }

    #[test]
    fn fixed_override_above_income_is_reported_literally() {
        let input = CalculationInput {
            tax_deductible_fixed: Some(dec!(111.11)),
            ..employment(dec!(100.00))
        };

        let result = calculate(&input).unwrap();

        assert_eq!(
            result,
            expected(
                dec!(13.71),
                dec!(7.77),
                dec!(111.11),
                dec!(0),
                dec!(0),
                dec!(78.52)
            )
        );
    }

    #[test]
    fn full_percent_override_covers_all_of_gross() {
        let input = CalculationInput {
            tax_deductible_percent: Some(dec!(100)),
            ..employment(dec!(5000.00))
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.tax_deductible_costs, dec!(5000.00));
        assert_eq!(result.pit_base, dec!(0));
        assert_eq!(result.pit, dec!(0));
        assert_eq!(result.net, dec!(3926.19));
    }

    #[test]
    fn creative_beats_fixed_override() {
        let input = CalculationInput {
            creative_50: true,
            tax_deductible_fixed: Some(dec!(111.11)),
            ..employment(dec!(5000.00))
        };

        let result = calculate(&input).unwrap();

        assert_eq!(result.tax_deductible_costs, dec!(2157.25));
        assert_eq!(result.pit_base, dec!(2157));
        assert_eq!(result.pit, dec!(258.84));
        assert_eq!(result.net, dec!(3667.35));
    }

    // =========================================================================
    // Breakdown tests
    // =========================================================================

    #[test]
    fn breakdown_records_stage_decisions() {
        let engine = PayrollEngine::builtin();
        let input = CalculationInput {
            age: 22,
            youth_tax_relief: true,
            creative_50: true,
            ..employment(dec!(6000.00))
        };

        let calculation = engine.calculate_detailed(&input).unwrap();
        let breakdown = calculation.breakdown;

        assert_eq!(breakdown.period, TaxPeriod::new(2025));
        assert_eq!(breakdown.parameters_version, "PL-2025.1");
        assert_eq!(breakdown.insurance, InsuranceStatus::Insured);
        assert_eq!(breakdown.social_components.len(), 3);
        assert_eq!(breakdown.capped_contribution_base, dec!(6000.00));
        assert_eq!(breakdown.cost_mode, CostMode::Creative);
        assert_eq!(breakdown.creative_costs, calculation.result.tax_deductible_costs);
        assert_eq!(
            breakdown.pit_state,
            PitState::Exempt(ExemptionReason::YouthRelief)
        );
    }

    #[test]
    fn breakdown_advances_year_to_date() {
        let engine = PayrollEngine::builtin();
        let mut ytd = YearToDateAccumulator::new(dec!(250000.00), dec!(0));
        let input = CalculationInput {
            year_to_date: Some(ytd.clone()),
            ..employment(dec!(20000.00))
        };

        let calculation = engine.calculate_detailed(&input).unwrap();
        ytd.record(&calculation.breakdown);

        assert_eq!(calculation.result.social_total, dec!(1637.39));
        assert_eq!(ytd.contribution_base, dec!(260190.00));
    }

    // =========================================================================
    // Validation and configuration tests
    // =========================================================================

    #[test]
    fn validate_input_rejects_negative_gross() {
        let result = validate_input(&employment(dec!(-0.01)));

        assert_eq!(result, Err(ValidationError::InvalidGross(dec!(-0.01))));
    }

    #[test]
    fn validate_input_rejects_sub_cent_gross() {
        let result = validate_input(&employment(dec!(100.005)));

        assert_eq!(result, Err(ValidationError::InvalidGross(dec!(100.005))));
    }

    #[test]
    fn validate_input_rejects_negative_year_to_date() {
        let input = CalculationInput {
            year_to_date: Some(YearToDateAccumulator::new(dec!(0), dec!(-1))),
            ..employment(dec!(1000.00))
        };

        let result = validate_input(&input);

        assert_eq!(
            result,
            Err(ValidationError::InvalidYearToDate {
                field: "creative_costs",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn calculate_reports_validation_before_period_lookup() {
        let input = CalculationInput {
            age: -3,
            period: Some(TaxPeriod::new(1999)),
            ..employment(dec!(1000.00))
        };

        let err = PayrollEngine::builtin().calculate(&input).unwrap_err();

        assert_eq!(
            err,
            CalculationError::Validation(ValidationError::InvalidAge { age: -3, max: 120 })
        );
    }

    #[test]
    fn calculate_unknown_period_is_unsupported() {
        let input = CalculationInput {
            period: Some(TaxPeriod::new(2019)),
            ..employment(dec!(1000.00))
        };

        let err = PayrollEngine::builtin().calculate(&input).unwrap_err();

        assert_eq!(err, CalculationError::UnsupportedPeriod(TaxPeriod::new(2019)));
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn calculate_contract_missing_from_table_is_invalid() {
        let mut params = crate::params::builtin::poland_2025();
        params.contracts.remove(&ContractType::Work);
        let mut registry = ParameterRegistry::new();
        registry.register(params).unwrap();
        let engine = PayrollEngine::new(registry, TaxPeriod::new(2025));

        let err = engine
            .calculate(&CalculationInput::new(dec!(1000.00), ContractType::Work))
            .unwrap_err();

        assert_eq!(
            err,
            CalculationError::Validation(ValidationError::InvalidContract("work".to_string()))
        );
    }

    #[test]
    fn engine_uses_default_period_when_request_has_none() {
        let engine = PayrollEngine::builtin();

        let calculation = engine
            .calculate_detailed(&employment(dec!(1000.00)))
            .unwrap();

        assert_eq!(engine.default_period(), TaxPeriod::new(LATEST_BUILTIN_YEAR));
        assert_eq!(calculation.breakdown.period, engine.default_period());
    }
}
