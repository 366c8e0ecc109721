//! Net-pay calculation engine for Polish payroll contracts.
//!
//! Given a gross amount and a contract type, the engine derives social
//! insurance contributions, the health contribution, tax-deductible costs,
//! the taxable base, personal income tax and net pay. All rates and
//! thresholds come from a versioned [`TaxParameters`] table looked up by
//! tax year.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::{CalculationInput, ContractType, calculate};
//!
//! let input = CalculationInput {
//!     age: 22,
//!     youth_tax_relief: true,
//!     ..CalculationInput::new(dec!(6000.00), ContractType::Employment)
//! };
//!
//! let result = calculate(&input).unwrap();
//!
//! assert_eq!(result.pit, dec!(0));
//! assert_eq!(result.net, dec!(4711.43));
//! ```

pub mod api;
pub mod calculations;
pub mod error;
pub mod models;
pub mod params;

pub use calculations::{Calculation, CalculationBreakdown, PayrollEngine, calculate};
pub use error::{CalculationError, ParameterError, ValidationError};
pub use models::*;
pub use params::ParameterRegistry;
