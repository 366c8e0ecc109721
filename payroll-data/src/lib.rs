//! Loads versioned payroll parameter tables from CSV files.

pub mod loader;

pub use loader::{
    ContractRulesRecord, ContributionRateRecord, DefaultCostsKind, ParameterLoaderError,
    ParameterTableLoader, PitBracketRecord, TableRecords, TaxYearRecord,
};
