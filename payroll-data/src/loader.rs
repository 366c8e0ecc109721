use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use payroll_core::{
    ContractRules, ContractType, ContributionRate, DefaultCosts, HealthBase, ParameterError,
    ParameterRegistry, PitBracket, SocialComponent, TaxParameters, TaxPeriod,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

pub const TAX_YEARS_FILE: &str = "tax_years.csv";
pub const CONTRIBUTION_RATES_FILE: &str = "contribution_rates.csv";
pub const CONTRACT_RULES_FILE: &str = "contract_rules.csv";
pub const PIT_BRACKETS_FILE: &str = "pit_brackets.csv";

/// Errors that can occur when loading parameter tables.
#[derive(Debug, Error)]
pub enum ParameterLoaderError {
    #[error("CSV parse error in {file}: {message}")]
    CsvParse { file: &'static str, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}, tax year {tax_year}: {message}")]
    InvalidValue {
        file: &'static str,
        tax_year: i32,
        message: String,
    },

    #[error("{file} has rows for tax year {tax_year}, which is missing from tax_years.csv")]
    UnknownYear { file: &'static str, tax_year: i32 },

    #[error("Tax year {0} is listed more than once in tax_years.csv")]
    DuplicateYear(i32),

    #[error("Tax year {tax_year} is invalid: {source}")]
    Parameters {
        tax_year: i32,
        #[source]
        source: ParameterError,
    },
}

/// A row of `tax_years.csv`: the scalar settings of one tax year.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxYearRecord {
    pub tax_year: i32,
    pub version: String,
    pub annual_contribution_cap: Decimal,
    pub health_base: HealthBase,
    pub creative_cost_rate: Decimal,
    pub creative_cost_cap: Decimal,
    pub tax_free_amount: Decimal,
    pub youth_relief_age_ceiling: u32,
    pub student_age_ceiling: u32,
}

/// A row of `contribution_rates.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContributionRateRecord {
    pub tax_year: i32,
    pub component: SocialComponent,
    pub rate: Decimal,
    pub capped: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DefaultCostsKind {
    Fixed,
    Rate,
}

/// A row of `contract_rules.csv`.
///
/// `insured_components` is a `|`-separated list of component names and may
/// be empty.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContractRulesRecord {
    pub tax_year: i32,
    pub contract: ContractType,
    pub insured_components: String,
    pub health_rate: Decimal,
    pub default_costs_kind: DefaultCostsKind,
    pub default_costs_value: Decimal,
    pub insurance_optional: bool,
    pub student_exempt_insurance: bool,
    pub student_exempt_pit: bool,
}

/// A row of `pit_brackets.csv`. `upper` is empty for the top bracket.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PitBracketRecord {
    pub tax_year: i32,
    pub lower: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Raw rows of the four table files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRecords {
    pub tax_years: Vec<TaxYearRecord>,
    pub contribution_rates: Vec<ContributionRateRecord>,
    pub contract_rules: Vec<ContractRulesRecord>,
    pub pit_brackets: Vec<PitBracketRecord>,
}

/// Loader for parameter tables stored as a directory of CSV files.
///
/// The directory holds `tax_years.csv`, `contribution_rates.csv`,
/// `contract_rules.csv` and `pit_brackets.csv`. Every row carries its
/// `tax_year`; rows are grouped by year into one [`TaxParameters`] each.
pub struct ParameterTableLoader;

impl ParameterTableLoader {
    /// Parse records of type `T` from a CSV reader.
    ///
    /// `file` only labels errors. The reader can be anything that implements
    /// `Read`, such as a file or a byte slice.
    pub fn parse<T, R>(
        file: &'static str,
        reader: R,
    ) -> Result<Vec<T>, ParameterLoaderError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: T = result.map_err(|err| ParameterLoaderError::CsvParse {
                file,
                message: err.to_string(),
            })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read all four files from `dir`.
    pub fn read_dir(dir: &Path) -> Result<TableRecords, ParameterLoaderError> {
        Ok(TableRecords {
            tax_years: Self::parse_file(dir, TAX_YEARS_FILE)?,
            contribution_rates: Self::parse_file(dir, CONTRIBUTION_RATES_FILE)?,
            contract_rules: Self::parse_file(dir, CONTRACT_RULES_FILE)?,
            pit_brackets: Self::parse_file(dir, PIT_BRACKETS_FILE)?,
        })
    }

    fn parse_file<T: DeserializeOwned>(
        dir: &Path,
        file: &'static str,
    ) -> Result<Vec<T>, ParameterLoaderError> {
        let path = dir.join(file);
        let reader = File::open(&path).map_err(|source| ParameterLoaderError::Io {
            path: path.clone(),
            source,
        })?;
        let records = Self::parse(file, reader)?;
        debug!(path = %path.display(), rows = records.len(), "parsed parameter file");
        Ok(records)
    }

    /// Group rows by tax year into validated tables, oldest first.
    ///
    /// # Errors
    ///
    /// - [`ParameterLoaderError::UnknownYear`] for rows whose year has no
    ///   `tax_years.csv` entry
    /// - [`ParameterLoaderError::InvalidValue`] for an unknown component name
    ///   or a contract listed twice
    /// - [`ParameterLoaderError::Parameters`] if an assembled table fails
    ///   [`TaxParameters::validate`]
    pub fn assemble(records: TableRecords) -> Result<Vec<TaxParameters>, ParameterLoaderError> {
        let mut tables: BTreeMap<i32, TaxParameters> = BTreeMap::new();

        for year in records.tax_years {
            if tables.contains_key(&year.tax_year) {
                return Err(ParameterLoaderError::DuplicateYear(year.tax_year));
            }
            tables.insert(year.tax_year, empty_table(year));
        }

        for record in records.contribution_rates {
            let table = table_for(&mut tables, CONTRIBUTION_RATES_FILE, record.tax_year)?;
            table.contribution_rates.push(ContributionRate {
                component: record.component,
                rate: record.rate,
                capped: record.capped,
            });
        }

        for record in records.contract_rules {
            let tax_year = record.tax_year;
            let contract = record.contract;
            let table = table_for(&mut tables, CONTRACT_RULES_FILE, tax_year)?;
            let rules = contract_rules(record)?;
            if table.contracts.insert(contract, rules).is_some() {
                return Err(ParameterLoaderError::InvalidValue {
                    file: CONTRACT_RULES_FILE,
                    tax_year,
                    message: format!("contract '{contract}' is listed more than once"),
                });
            }
        }

        for record in records.pit_brackets {
            let table = table_for(&mut tables, PIT_BRACKETS_FILE, record.tax_year)?;
            table.pit_brackets.push(PitBracket {
                lower: record.lower,
                upper: record.upper,
                rate: record.rate,
            });
        }

        tables
            .into_iter()
            .map(|(tax_year, mut table)| {
                table.pit_brackets.sort_by(|a, b| a.lower.cmp(&b.lower));
                table
                    .validate()
                    .map_err(|source| ParameterLoaderError::Parameters { tax_year, source })?;
                Ok(table)
            })
            .collect()
    }

    /// Read and assemble every table in `dir`.
    pub fn load_dir(dir: &Path) -> Result<Vec<TaxParameters>, ParameterLoaderError> {
        Self::assemble(Self::read_dir(dir)?)
    }

    /// Build a registry holding every table in `dir`.
    pub fn load_registry(dir: &Path) -> Result<ParameterRegistry, ParameterLoaderError> {
        let mut registry = ParameterRegistry::new();

        for table in Self::load_dir(dir)? {
            let tax_year = table.period.tax_year();
            let version = table.version.clone();
            registry
                .register(table)
                .map_err(|source| ParameterLoaderError::Parameters { tax_year, source })?;
            info!(tax_year, %version, dir = %dir.display(), "loaded tax parameter table");
        }

        Ok(registry)
    }
}

fn empty_table(year: TaxYearRecord) -> TaxParameters {
    TaxParameters {
        period: TaxPeriod::new(year.tax_year),
        version: year.version,
        contribution_rates: Vec::new(),
        annual_contribution_cap: year.annual_contribution_cap,
        health_base: year.health_base,
        creative_cost_rate: year.creative_cost_rate,
        creative_cost_cap: year.creative_cost_cap,
        tax_free_amount: year.tax_free_amount,
        pit_brackets: Vec::new(),
        youth_relief_age_ceiling: year.youth_relief_age_ceiling,
        student_age_ceiling: year.student_age_ceiling,
        contracts: BTreeMap::new(),
    }
}

fn table_for<'a>(
    tables: &'a mut BTreeMap<i32, TaxParameters>,
    file: &'static str,
    tax_year: i32,
) -> Result<&'a mut TaxParameters, ParameterLoaderError> {
    tables
        .get_mut(&tax_year)
        .ok_or(ParameterLoaderError::UnknownYear { file, tax_year })
}

fn contract_rules(record: ContractRulesRecord) -> Result<ContractRules, ParameterLoaderError> {
    let insured_components = record
        .insured_components
        .split('|')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            SocialComponent::parse(name).ok_or_else(|| ParameterLoaderError::InvalidValue {
                file: CONTRACT_RULES_FILE,
                tax_year: record.tax_year,
                message: format!("unknown social component '{name}'"),
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    let default_costs = match record.default_costs_kind {
        DefaultCostsKind::Fixed => DefaultCosts::Fixed(record.default_costs_value),
        DefaultCostsKind::Rate => DefaultCosts::Rate(record.default_costs_value),
    };

    Ok(ContractRules {
        insured_components,
        health_rate: record.health_rate,
        default_costs,
        insurance_optional: record.insurance_optional,
        student_exempt_insurance: record.student_exempt_insurance,
        student_exempt_pit: record.student_exempt_pit,
    })
}
