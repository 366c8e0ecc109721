//! Health contribution calculation.
//!
//! The base is gross pay net of social contributions (or plain gross, per the
//! table's [`HealthBase`]), clamped at zero. The rate comes from the
//! contract's rules, so a contract without health insurance is simply a zero
//! rate in the table.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::contributions::InsuranceStatus;
use crate::error::ValidationError;
use crate::models::{ContractType, HealthBase, TaxParameters};

/// Calculator for the health contribution.
#[derive(Debug, Clone)]
pub struct HealthCalculator<'a> {
    params: &'a TaxParameters,
}

impl<'a> HealthCalculator<'a> {
    pub fn new(params: &'a TaxParameters) -> Self {
        Self { params }
    }

    /// Computes `rate × base`, rounded half-up to the cent.
    ///
    /// Waived insurance waives the health contribution too.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidContract`] if the table has no rules for
    /// `contract`.
    pub fn calculate(
        &self,
        gross: Decimal,
        social_total: Decimal,
        contract: ContractType,
        insurance: InsuranceStatus,
    ) -> Result<Decimal, ValidationError> {
        let rules = self.params.require_rules(contract)?;

        if !insurance.is_insured() {
            return Ok(Decimal::ZERO);
        }

        let base = self.base(gross, social_total);
        let health = round_half_up(base * rules.health_rate);
        debug!(%base, rate = %rules.health_rate, %health, "health contribution");

        Ok(health)
    }

    fn base(
        &self,
        gross: Decimal,
        social_total: Decimal,
    ) -> Decimal {
        match self.params.health_base {
            HealthBase::GrossLessSocial => non_negative(gross - social_total),
            HealthBase::Gross => non_negative(gross),
        }
    }
}
