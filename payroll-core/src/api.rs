//! JSON request and response contract.
//!
//! Field names match the existing front end exactly. Amounts travel as JSON
//! numbers and become [`Decimal`] here, before any arithmetic happens.
//!
//! ```
//! use payroll_core::PayrollEngine;
//! use payroll_core::api::{CalcRequest, CalcResponse};
//!
//! let request: CalcRequest = serde_json::from_str(
//!     r#"{ "gross": 5000, "contract": "employment", "age": 30,
//!          "is_student": false, "youth_tax_relief": false, "creative_50": false }"#,
//! )
//! .unwrap();
//!
//! let input: payroll_core::CalculationInput = request.try_into().unwrap();
//! let response = CalcResponse::from(PayrollEngine::builtin().calculate(&input).unwrap());
//!
//! assert_eq!(response.net, rust_decimal_macros::dec!(3438.51));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CalculationError, ValidationError};
use crate::models::{
    CalculationInput, CalculationResult, ContractType, DEFAULT_AGE, TaxPeriod,
    YearToDateAccumulator,
};

fn default_age() -> i32 {
    DEFAULT_AGE
}

fn default_true() -> bool {
    true
}

/// Calculation request as sent by the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub gross: Decimal,
    pub contract: String,
    #[serde(default = "default_age")]
    pub age: i32,
    #[serde(default)]
    pub is_student: bool,
    #[serde(default)]
    pub youth_tax_relief: bool,
    #[serde(default)]
    pub creative_50: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax_deductible_fixed: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax_deductible_percent: Option<Decimal>,
    #[serde(default = "default_true")]
    pub include_social_for_mandate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_to_date: Option<YearToDateAccumulator>,
}

impl CalcRequest {
    /// Request with only the required fields set.
    pub fn new(
        gross: Decimal,
        contract: impl Into<String>,
    ) -> Self {
        Self {
            gross,
            contract: contract.into(),
            age: DEFAULT_AGE,
            is_student: false,
            youth_tax_relief: false,
            creative_50: false,
            tax_deductible_fixed: None,
            tax_deductible_percent: None,
            include_social_for_mandate: true,
            tax_year: None,
            year_to_date: None,
        }
    }
}

impl TryFrom<CalcRequest> for CalculationInput {
    type Error = ValidationError;

    /// Resolves the contract tag. Range checks happen in the engine.
    fn try_from(request: CalcRequest) -> Result<Self, Self::Error> {
        let contract = ContractType::parse(&request.contract)
            .ok_or(ValidationError::InvalidContract(request.contract))?;

        Ok(Self {
            gross: request.gross,
            contract,
            age: request.age,
            is_student: request.is_student,
            youth_tax_relief: request.youth_tax_relief,
            creative_50: request.creative_50,
            tax_deductible_fixed: request.tax_deductible_fixed,
            tax_deductible_percent: request.tax_deductible_percent,
            voluntary_insurance: request.include_social_for_mandate,
            period: request.tax_year.map(TaxPeriod::new),
            year_to_date: request.year_to_date,
        })
    }
}

/// Calculation response; every amount has two decimal places at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub social_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub health: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_deductible_costs: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pit_base: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub net: Decimal,
}

impl From<CalculationResult> for CalcResponse {
    fn from(result: CalculationResult) -> Self {
        Self {
            social_total: result.social_total,
            health: result.health,
            tax_deductible_costs: result.tax_deductible_costs,
            pit_base: result.pit_base,
            pit: result.pit,
            net: result.net,
        }
    }
}

/// Error class a boundary layer maps to its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller can correct the request (4xx).
    Validation,
    /// No parameter table for the requested period (5xx).
    Configuration,
    /// Internal defect (5xx).
    Internal,
}

/// Error body returned instead of a [`CalcResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    /// Validation error for a request that could not be parsed at all.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: ErrorKind::Validation,
            field: None,
        }
    }
}

impl From<&CalculationError> for ErrorResponse {
    fn from(err: &CalculationError) -> Self {
        let (kind, field) = match err {
            CalculationError::Validation(validation) => {
                (ErrorKind::Validation, Some(validation.field().to_string()))
            }
            CalculationError::UnsupportedPeriod(_) => (ErrorKind::Configuration, None),
            CalculationError::ComputationInvariantViolation(_) => (ErrorKind::Internal, None),
        };
        Self {
            error: err.to_string(),
            kind,
            field,
        }
    }
}
