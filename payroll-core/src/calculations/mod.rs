//! Payroll calculators and the pipeline that chains them.
//!
//! Each stage is a small calculator borrowing the [`TaxParameters`] table
//! for its tax year. [`PayrollEngine`] runs them in order; the calculators
//! are public so a single stage can be checked on its own.
//!
//! [`TaxParameters`]: crate::models::TaxParameters

pub mod common;
mod contributions;
mod deductible_costs;
mod health;
mod net_pay;
mod pipeline;
mod pit;
mod taxable_base;

pub use contributions::{
    ComponentContribution, ContributionCalculator, ContributionResult, InsuranceStatus,
};
pub use deductible_costs::{
    CostMode, DeductibleCosts, DeductibleCostsCalculator, validate_overrides,
};
pub use health::HealthCalculator;
pub use net_pay::assemble_net_pay;
pub use pipeline::{
    Calculation, CalculationBreakdown, PayrollEngine, calculate, validate_input,
};
pub use pit::{ExemptionReason, PitCalculator, PitState, validate_age};
pub use taxable_base::taxable_base;
