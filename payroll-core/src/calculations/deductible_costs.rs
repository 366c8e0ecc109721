//! Tax-deductible costs (KUP).
//!
//! Exactly one cost mode is effective per calculation, chosen by precedence:
//!
//! | Order | Mode | Costs |
//! |-------|------|-------|
//! | 1     | `creative_50` set | creative rate × (gross − social), up to the creative ceiling |
//! | 2     | `tax_deductible_fixed` set | the literal amount |
//! | 3     | `tax_deductible_percent` set | percent / 100 × gross |
//! | 4     | none of the above | the contract's default costs |
//!
//! Lower-precedence options that were also supplied are ignored with a
//! warning, but are still validated. Contract-default costs never exceed
//! the income they offset, `max(0, gross − social)`. Overrides are reported
//! as computed; the taxable base clamps at zero instead.
//!
//! The creative ceiling is annual. Without a [`YearToDateAccumulator`] it is
//! applied to the single call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::ValidationError;
use crate::models::{CalculationInput, DefaultCosts, TaxParameters, YearToDateAccumulator};

const HUNDRED: Decimal = dec!(100);

/// The cost mode that took effect, with the override value it used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "value")]
pub enum CostMode {
    Creative,
    Fixed(Decimal),
    Percent(Decimal),
    ContractDefault,
}

impl CostMode {
    /// Picks the effective mode by precedence.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use payroll_core::{CalculationInput, ContractType};
    /// use payroll_core::calculations::CostMode;
    ///
    /// let input = CalculationInput {
    ///     creative_50: true,
    ///     tax_deductible_fixed: Some(dec!(111.11)),
    ///     ..CalculationInput::new(dec!(5000.00), ContractType::Work)
    /// };
    ///
    /// assert_eq!(CostMode::resolve(&input), CostMode::Creative);
    /// ```
    pub fn resolve(input: &CalculationInput) -> Self {
        let mode = if input.creative_50 {
            Self::Creative
        } else if let Some(fixed) = input.tax_deductible_fixed {
            Self::Fixed(fixed)
        } else if let Some(percent) = input.tax_deductible_percent {
            Self::Percent(percent)
        } else {
            Self::ContractDefault
        };

        let fixed_ignored = input.tax_deductible_fixed.is_some() && mode == Self::Creative;
        let percent_ignored = input.tax_deductible_percent.is_some()
            && matches!(mode, Self::Creative | Self::Fixed(_));
        if fixed_ignored || percent_ignored {
            warn!(
                ?mode,
                fixed = ?input.tax_deductible_fixed,
                percent = ?input.tax_deductible_percent,
                "several deductible-cost options supplied; lower-precedence options ignored"
            );
        }

        mode
    }
}

/// Checks every supplied override, effective or not.
///
/// # Errors
///
/// [`ValidationError::InvalidOverride`] if the fixed amount is negative or
/// the percentage is outside [0, 100].
pub fn validate_overrides(input: &CalculationInput) -> Result<(), ValidationError> {
    if let Some(fixed) = input.tax_deductible_fixed {
        if fixed < Decimal::ZERO {
            return Err(ValidationError::InvalidOverride {
                field: "tax_deductible_fixed",
                value: fixed,
            });
        }
    }
    if let Some(percent) = input.tax_deductible_percent {
        if percent < Decimal::ZERO || percent > HUNDRED {
            return Err(ValidationError::InvalidOverride {
                field: "tax_deductible_percent",
                value: percent,
            });
        }
    }
    Ok(())
}

/// Output of the deductible-costs stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductibleCosts {
    pub mode: CostMode,
    pub amount: Decimal,
    /// Part of `amount` counted against the creative ceiling.
    pub creative_costs: Decimal,
}

/// Calculator for tax-deductible costs.
#[derive(Debug, Clone)]
pub struct DeductibleCostsCalculator<'a> {
    params: &'a TaxParameters,
}

impl<'a> DeductibleCostsCalculator<'a> {
    pub fn new(params: &'a TaxParameters) -> Self {
        Self { params }
    }

    /// Resolves the cost mode and computes the deductible costs.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidOverride`] for an out-of-range override
    /// - [`ValidationError::InvalidContract`] if the table has no rules for
    ///   the contract
    pub fn calculate(
        &self,
        input: &CalculationInput,
        social_total: Decimal,
    ) -> Result<DeductibleCosts, ValidationError> {
        validate_overrides(input)?;
        let rules = self.params.require_rules(input.contract)?;

        let income = non_negative(input.gross - social_total);
        let mode = CostMode::resolve(input);

        let amount = match mode {
            CostMode::Creative => {
                round_half_up(self.creative_costs(income, input.year_to_date.as_ref()))
            }
            CostMode::Fixed(amount) => round_half_up(amount),
            CostMode::Percent(percent) => round_half_up(percent / HUNDRED * input.gross),
            CostMode::ContractDefault => {
                let costs = match rules.default_costs {
                    DefaultCosts::Fixed(amount) => amount,
                    DefaultCosts::Rate(rate) => rate * income,
                };
                self.limit_to_income(round_half_up(costs), income)
            }
        };
        debug!(?mode, %amount, "deductible costs");

        Ok(DeductibleCosts {
            mode,
            amount,
            creative_costs: if mode == CostMode::Creative {
                amount
            } else {
                Decimal::ZERO
            },
        })
    }

    /// Creative-rate costs, limited to what is left of the creative ceiling.
    fn creative_costs(
        &self,
        income: Decimal,
        year_to_date: Option<&YearToDateAccumulator>,
    ) -> Decimal {
        let cap = self.params.creative_cost_cap;
        let remaining = year_to_date.map_or(cap, |ytd| ytd.remaining_creative_cap(cap));
        let costs = income * self.params.creative_cost_rate;

        if costs > remaining {
            warn!(
                costs = %costs,
                remaining_cap = %remaining,
                annual_cap = %cap,
                "creative-work costs exceed remaining annual ceiling; truncated"
            );
        }

        min(costs, remaining)
    }

    fn limit_to_income(
        &self,
        costs: Decimal,
        income: Decimal,
    ) -> Decimal {
        if costs > income {
            debug!(%costs, %income, "deductible costs limited to income");
        }
        min(costs, income)
    }
}
