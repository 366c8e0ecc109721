mod calculation_input;
mod calculation_result;
mod contract_type;
mod social_component;
mod tax_parameters;
mod tax_period;
mod year_to_date;

pub use calculation_input::{CalculationInput, DEFAULT_AGE, MAX_AGE};
pub use calculation_result::CalculationResult;
pub use contract_type::ContractType;
pub use social_component::SocialComponent;
pub use tax_parameters::{
    ContractRules, ContributionRate, DefaultCosts, HealthBase, PitBracket, TaxParameters,
};
pub use tax_period::TaxPeriod;
pub use year_to_date::YearToDateAccumulator;
