//! Error types for payroll calculations and parameter tables.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{ContractType, SocialComponent, TaxPeriod};

/// A request that cannot be priced as submitted. Always user-correctable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Gross pay is negative or has more than two decimal places.
    #[error("gross must be a non-negative amount with at most two decimal places, got {0}")]
    InvalidGross(Decimal),

    /// The contract tag is unknown, or the selected table has no rules for it.
    #[error("unknown contract type '{0}'")]
    InvalidContract(String),

    /// Age is negative or above the accepted maximum.
    #[error("age must be between 0 and {max}, got {age}")]
    InvalidAge { age: i32, max: i32 },

    /// A deductible-cost override is outside its range.
    #[error("{field} is out of range: {value}")]
    InvalidOverride { field: &'static str, value: Decimal },

    /// A year-to-date total is negative.
    #[error("year-to-date {field} must be non-negative, got {value}")]
    InvalidYearToDate { field: &'static str, value: Decimal },
}

impl ValidationError {
    /// Name of the request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidGross(_) => "gross",
            Self::InvalidContract(_) => "contract",
            Self::InvalidAge { .. } => "age",
            Self::InvalidOverride { field, .. } => field,
            Self::InvalidYearToDate { .. } => "year_to_date",
        }
    }
}

/// A parameter table that must not be registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("{name} rate must be between 0 and 1, got {value}")]
    InvalidRate { name: String, value: Decimal },

    #[error("{name} must be positive, got {value}")]
    InvalidCap { name: &'static str, value: Decimal },

    #[error("tax-free amount must be non-negative, got {0}")]
    InvalidTaxFreeAmount(Decimal),

    #[error("duplicate contribution rate for {0}")]
    DuplicateComponent(SocialComponent),

    #[error("{contract} insures {component} but the table has no rate for it")]
    MissingContributionRate {
        contract: ContractType,
        component: SocialComponent,
    },

    #[error("invalid PIT brackets: {0}")]
    InvalidBrackets(String),

    #[error("default costs for {contract} are out of range: {value}")]
    InvalidDefaultCosts {
        contract: ContractType,
        value: Decimal,
    },

    #[error("no contract rules defined")]
    NoContractRules,
}

/// Failure of a single `calculate` call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// Malformed, out-of-range input. The caller can fix and resubmit.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No parameter table is registered for the requested tax year.
    #[error("no tax parameters registered for period {0}")]
    UnsupportedPeriod(TaxPeriod),

    /// An internal consistency check failed. Indicates a defect in a
    /// parameter table or calculator, never bad input.
    #[error("computation invariant violated: {0}")]
    ComputationInvariantViolation(String),
}

impl CalculationError {
    /// `true` when resubmitting a corrected request can succeed.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
