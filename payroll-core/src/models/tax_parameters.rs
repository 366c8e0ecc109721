use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, ValidationError};
use crate::models::{ContractType, SocialComponent, TaxPeriod};

/// Rate of one social insurance component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRate {
    pub component: SocialComponent,
    pub rate: Decimal,
    /// Whether the component stops accruing at the annual contribution cap.
    pub capped: bool,
}

/// Base the health contribution is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBase {
    /// Gross pay minus the social contributions total.
    GrossLessSocial,
    /// Gross pay as is.
    Gross,
}

/// Deductible costs applied when the caller supplies no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DefaultCosts {
    /// A flat amount per calculation.
    Fixed(Decimal),
    /// A rate applied to gross pay minus social contributions.
    Rate(Decimal),
}

/// Everything the calculators need to know about one contract type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRules {
    /// Social components charged on this contract. Anything not listed is
    /// exempt.
    pub insured_components: BTreeSet<SocialComponent>,
    pub health_rate: Decimal,
    pub default_costs: DefaultCosts,
    /// The contractor may opt out of social insurance.
    pub insurance_optional: bool,
    /// Students under the student age ceiling pay no social or health
    /// contributions.
    pub student_exempt_insurance: bool,
    /// Students under the student age ceiling pay no PIT.
    pub student_exempt_pit: bool,
}

/// One progressive PIT bracket. `upper` is `None` for the top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitBracket {
    pub lower: Decimal,
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

/// Immutable, versioned bundle of every rate and threshold for one tax year.
///
/// Tables are plain data: a new tax year is a new `TaxParameters` value
/// registered with a [`ParameterRegistry`](crate::params::ParameterRegistry),
/// never a code change in the calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxParameters {
    pub period: TaxPeriod,
    /// Free-form label identifying the revision of this table.
    pub version: String,
    pub contribution_rates: Vec<ContributionRate>,
    /// Annual base cap for capped social components.
    pub annual_contribution_cap: Decimal,
    pub health_base: HealthBase,
    /// Share of income treated as costs for creative work.
    pub creative_cost_rate: Decimal,
    /// Annual ceiling on creative-work costs.
    pub creative_cost_cap: Decimal,
    pub tax_free_amount: Decimal,
    /// Brackets sorted ascending by `lower`, contiguous, starting at zero.
    pub pit_brackets: Vec<PitBracket>,
    /// Youth relief applies to ages strictly below this value.
    pub youth_relief_age_ceiling: u32,
    /// Student exemptions apply to ages strictly below this value.
    pub student_age_ceiling: u32,
    pub contracts: BTreeMap<ContractType, ContractRules>,
}

impl TaxParameters {
    pub fn rules_for(
        &self,
        contract: ContractType,
    ) -> Option<&ContractRules> {
        self.contracts.get(&contract)
    }

    /// Rules for `contract`, or [`ValidationError::InvalidContract`] when the
    /// table does not price that contract type.
    pub fn require_rules(
        &self,
        contract: ContractType,
    ) -> Result<&ContractRules, ValidationError> {
        self.rules_for(contract)
            .ok_or_else(|| ValidationError::InvalidContract(contract.to_string()))
    }

    pub fn contribution_rate(
        &self,
        component: SocialComponent,
    ) -> Option<&ContributionRate> {
        self.contribution_rates
            .iter()
            .find(|r| r.component == component)
    }

    /// Checks that every rate, cap and bracket in the table is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] if:
    /// - a contribution, health, creative or bracket rate is outside [0, 1]
    /// - a component has two rates, or a contract insures a component
    ///   without a rate
    /// - a cap is not positive or the tax-free amount is negative
    /// - brackets are empty, do not start at zero, overlap, leave gaps, or
    ///   have an unbounded bracket anywhere but last
    /// - a contract's default costs are negative or its rate exceeds 1
    /// - no contract rules are defined
    pub fn validate(&self) -> Result<(), ParameterError> {
        let mut seen = BTreeSet::new();
        for rate in &self.contribution_rates {
            check_rate(rate.component.as_str(), rate.rate)?;
            if !seen.insert(rate.component) {
                return Err(ParameterError::DuplicateComponent(rate.component));
            }
        }

        if self.annual_contribution_cap <= Decimal::ZERO {
            return Err(ParameterError::InvalidCap {
                name: "annual contribution cap",
                value: self.annual_contribution_cap,
            });
        }
        if self.creative_cost_cap <= Decimal::ZERO {
            return Err(ParameterError::InvalidCap {
                name: "creative cost cap",
                value: self.creative_cost_cap,
            });
        }
        check_rate("creative cost", self.creative_cost_rate)?;
        if self.tax_free_amount < Decimal::ZERO {
            return Err(ParameterError::InvalidTaxFreeAmount(self.tax_free_amount));
        }

        self.validate_brackets()?;

        if self.contracts.is_empty() {
            return Err(ParameterError::NoContractRules);
        }
        for (contract, rules) in &self.contracts {
            check_rate(&format!("{contract} health"), rules.health_rate)?;
            for component in &rules.insured_components {
                if !seen.contains(component) {
                    return Err(ParameterError::MissingContributionRate {
                        contract: *contract,
                        component: *component,
                    });
                }
            }
            let value = match rules.default_costs {
                DefaultCosts::Fixed(amount) => (amount < Decimal::ZERO).then_some(amount),
                DefaultCosts::Rate(rate) => {
                    (rate < Decimal::ZERO || rate > Decimal::ONE).then_some(rate)
                }
            };
            if let Some(value) = value {
                return Err(ParameterError::InvalidDefaultCosts {
                    contract: *contract,
                    value,
                });
            }
        }

        Ok(())
    }

    fn validate_brackets(&self) -> Result<(), ParameterError> {
        let first = self
            .pit_brackets
            .first()
            .ok_or_else(|| ParameterError::InvalidBrackets("no brackets".to_string()))?;
        if first.lower != Decimal::ZERO {
            return Err(ParameterError::InvalidBrackets(format!(
                "first bracket starts at {}, expected 0",
                first.lower
            )));
        }

        let last_index = self.pit_brackets.len() - 1;
        for (i, bracket) in self.pit_brackets.iter().enumerate() {
            check_rate("bracket", bracket.rate)?;
            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(ParameterError::InvalidBrackets(format!(
                        "bracket {i} has upper edge {upper} not above lower edge {}",
                        bracket.lower
                    )));
                }
                None if i != last_index => {
                    return Err(ParameterError::InvalidBrackets(format!(
                        "bracket {i} is unbounded but is not the last bracket"
                    )));
                }
                _ => {}
            }
            if let Some(next) = self.pit_brackets.get(i + 1) {
                if bracket.upper != Some(next.lower) {
                    return Err(ParameterError::InvalidBrackets(format!(
                        "bracket {} starts at {} but bracket {i} ends at {:?}",
                        i + 1,
                        next.lower,
                        bracket.upper
                    )));
                }
            }
        }
        if self.pit_brackets[last_index].upper.is_some() {
            return Err(ParameterError::InvalidBrackets(
                "top bracket must be unbounded".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_rate(
    name: &str,
    rate: Decimal,
) -> Result<(), ParameterError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ParameterError::InvalidRate {
            name: name.to_string(),
            value: rate,
        });
    }
    Ok(())
}
