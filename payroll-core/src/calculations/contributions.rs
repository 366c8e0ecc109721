//! Employee-side social insurance contributions.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Resolve insurance status: insured, exempt student, or opted out |
//! | 2    | Capped base, if a capped component is insured: gross limited to what is left of the annual cap |
//! | 3    | Each component the contract insures: rate × base (capped or gross) |
//! | 4    | `social_total`: sum of the rounded components |
//!
//! Which components a contract pays, and at what rate, comes from the
//! [`TaxParameters`] table. The calculator never branches on the contract
//! type itself.
//!
//! Without a [`YearToDateAccumulator`] the annual cap is applied to the single
//! gross amount passed in, so a payroll year split across several calls will
//! overpay capped components once the cumulative base passes the cap.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::ContractType;
//! use payroll_core::calculations::{ContributionCalculator, InsuranceStatus};
//! use payroll_core::params::builtin::poland_2025;
//!
//! let params = poland_2025();
//! let calculator = ContributionCalculator::new(&params);
//!
//! let result = calculator
//!     .calculate(dec!(5000.00), ContractType::Employment, InsuranceStatus::Insured, None)
//!     .unwrap();
//!
//! // 9.76% + 1.50% + 2.45% of 5000.00
//! assert_eq!(result.social_total, dec!(685.50));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{min, round_half_up, under_age_ceiling};
use crate::error::ValidationError;
use crate::models::{
    CalculationInput, ContractRules, ContractType, ContributionRate, SocialComponent,
    TaxParameters, YearToDateAccumulator,
};

/// Whether social insurance (and with it the health contribution) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceStatus {
    Insured,
    /// Student under the age ceiling on a contract that exempts students.
    StudentExempt,
    /// Contractor declined optional insurance.
    OptedOut,
}

impl InsuranceStatus {
    /// Decides the status from the request and the contract's rules.
    ///
    /// The student exemption is checked first, so a qualifying student who
    /// also opts out is reported as `StudentExempt`.
    pub fn resolve(
        input: &CalculationInput,
        rules: &ContractRules,
        params: &TaxParameters,
    ) -> Self {
        if rules.student_exempt_insurance
            && input.is_student
            && under_age_ceiling(input.age, params.student_age_ceiling)
        {
            Self::StudentExempt
        } else if rules.insurance_optional && !input.voluntary_insurance {
            Self::OptedOut
        } else {
            Self::Insured
        }
    }

    pub fn is_insured(&self) -> bool {
        matches!(self, Self::Insured)
    }
}

/// One charged social component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentContribution {
    pub component: SocialComponent,
    pub rate: Decimal,
    /// Base the rate was applied to.
    pub base: Decimal,
    pub capped: bool,
    pub amount: Decimal,
}

/// Output of the contribution stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub insurance: InsuranceStatus,
    pub components: Vec<ComponentContribution>,
    /// Base counted against the annual cap; zero when no capped component
    /// was charged.
    pub capped_base: Decimal,
    pub social_total: Decimal,
}

impl ContributionResult {
    fn waived(insurance: InsuranceStatus) -> Self {
        Self {
            insurance,
            components: Vec::new(),
            capped_base: Decimal::ZERO,
            social_total: Decimal::ZERO,
        }
    }
}

/// Calculator for employee social insurance contributions.
#[derive(Debug, Clone)]
pub struct ContributionCalculator<'a> {
    params: &'a TaxParameters,
}

impl<'a> ContributionCalculator<'a> {
    pub fn new(params: &'a TaxParameters) -> Self {
        Self { params }
    }

    /// Computes every component the contract insures and their total.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidContract`] if the table has no rules for
    /// `contract`.
    pub fn calculate(
        &self,
        gross: Decimal,
        contract: ContractType,
        insurance: InsuranceStatus,
        year_to_date: Option<&YearToDateAccumulator>,
    ) -> Result<ContributionResult, ValidationError> {
        let rules = self.params.require_rules(contract)?;

        if !insurance.is_insured() {
            debug!(%contract, ?insurance, "social insurance waived");
            return Ok(ContributionResult::waived(insurance));
        }

        let insured: Vec<&ContributionRate> = self
            .params
            .contribution_rates
            .iter()
            .filter(|rate| rules.insured_components.contains(&rate.component))
            .collect();

        let capped_base = if insured.iter().any(|rate| rate.capped) {
            self.capped_base(gross, year_to_date)
        } else {
            Decimal::ZERO
        };

        let components: Vec<ComponentContribution> = insured
            .into_iter()
            .map(|rate| self.component(rate, gross, capped_base))
            .collect();
        let social_total = self.social_total(&components);

        Ok(ContributionResult {
            insurance,
            components,
            capped_base,
            social_total,
        })
    }

    /// Gross limited to the part of the annual cap not yet used.
    fn capped_base(
        &self,
        gross: Decimal,
        year_to_date: Option<&YearToDateAccumulator>,
    ) -> Decimal {
        let cap = self.params.annual_contribution_cap;
        let remaining = year_to_date.map_or(cap, |ytd| ytd.remaining_contribution_cap(cap));

        if gross > remaining {
            warn!(
                gross = %gross,
                remaining_cap = %remaining,
                annual_cap = %cap,
                "gross exceeds remaining annual contribution cap; capped components truncated"
            );
        }

        min(gross, remaining)
    }

    fn component(
        &self,
        rate: &ContributionRate,
        gross: Decimal,
        capped_base: Decimal,
    ) -> ComponentContribution {
        let base = if rate.capped { capped_base } else { gross };
        ComponentContribution {
            component: rate.component,
            rate: rate.rate,
            base,
            capped: rate.capped,
            amount: round_half_up(base * rate.rate),
        }
    }

    fn social_total(
        &self,
        components: &[ComponentContribution],
    ) -> Decimal {
        round_half_up(components.iter().map(|c| c.amount).sum())
    }
}
