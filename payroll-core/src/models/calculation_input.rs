use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ContractType, TaxPeriod, YearToDateAccumulator};

/// Age assumed when a request does not state one.
pub const DEFAULT_AGE: i32 = 30;

/// Oldest age the engine accepts.
pub const MAX_AGE: i32 = 120;

/// One payroll calculation request, validated once and then read-only.
///
/// When several deductible-cost options are set, exactly one takes effect,
/// in this order: `creative_50`, then `tax_deductible_fixed`, then
/// `tax_deductible_percent`, then the contract's default costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub gross: Decimal,
    pub contract: ContractType,
    pub age: i32,
    pub is_student: bool,
    pub youth_tax_relief: bool,
    pub creative_50: bool,
    pub tax_deductible_fixed: Option<Decimal>,
    /// Percentage of gross in [0, 100].
    pub tax_deductible_percent: Option<Decimal>,
    /// Keep social insurance on contracts where it is optional.
    pub voluntary_insurance: bool,
    /// Tax year to price against; the engine default when `None`.
    pub period: Option<TaxPeriod>,
    /// Earnings already counted this year. Without it every cap is applied
    /// to this single call.
    pub year_to_date: Option<YearToDateAccumulator>,
}

impl CalculationInput {
    /// Input with every optional field at its default.
    pub fn new(
        gross: Decimal,
        contract: ContractType,
    ) -> Self {
        Self {
            gross,
            contract,
            age: DEFAULT_AGE,
            is_student: false,
            youth_tax_relief: false,
            creative_50: false,
            tax_deductible_fixed: None,
            tax_deductible_percent: None,
            voluntary_insurance: true,
            period: None,
            year_to_date: None,
        }
    }
}
