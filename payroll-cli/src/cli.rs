//! Command-line definition for `payroll-calc`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use payroll_core::TaxPeriod;
use payroll_core::api::CalcRequest;
use rust_decimal::Decimal;

/// Net pay calculator for Polish payroll contracts.
///
/// Reads a JSON request from `--request` (a file, or `-` for stdin), or
/// builds one from the individual field flags, and prints the JSON
/// response on stdout. Exit code 2 means the request was invalid; 1 means
/// any other failure.
#[derive(Debug, Parser)]
#[command(name = "payroll-calc")]
#[command(version, about)]
pub struct Cli {
    /// JSON request file, or `-` to read stdin.
    #[arg(long, conflicts_with_all = ["gross", "contract"])]
    pub request: Option<PathBuf>,

    /// Gross pay.
    #[arg(long, requires = "contract", allow_negative_numbers = true)]
    pub gross: Option<Decimal>,

    /// Contract type: employment, mandate or work.
    #[arg(long, requires = "gross")]
    pub contract: Option<String>,

    /// Applicant age.
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i32>,

    /// Applicant is a student.
    #[arg(long)]
    pub student: bool,

    /// Claim youth tax relief.
    #[arg(long)]
    pub youth_relief: bool,

    /// Use creative-work costs.
    #[arg(long)]
    pub creative: bool,

    /// Fixed deductible costs.
    #[arg(long, allow_negative_numbers = true)]
    pub costs_fixed: Option<Decimal>,

    /// Deductible costs as a percentage of gross (0-100).
    #[arg(long, allow_negative_numbers = true)]
    pub costs_percent: Option<Decimal>,

    /// Opt out of social insurance where the contract allows it.
    #[arg(long)]
    pub no_social: bool,

    /// Default tax year for requests that do not name one.
    #[arg(long, conflicts_with = "date")]
    pub year: Option<i32>,

    /// Default tax year taken from a payment date (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Directory of parameter CSV files to use instead of the built-in tables.
    #[arg(long)]
    pub params_dir: Option<PathBuf>,

    /// Print the calculation breakdown next to the result.
    #[arg(long)]
    pub detailed: bool,

    /// Load the parameter tables, report the available tax years and exit.
    #[arg(long, conflicts_with_all = ["request", "gross"])]
    pub check: bool,
}

/// Where the request comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSource {
    Stdin,
    File(PathBuf),
    Flags(CalcRequest),
}

impl Cli {
    /// Default tax period chosen on the command line, if any.
    pub fn default_period(&self) -> Option<TaxPeriod> {
        self.year
            .map(TaxPeriod::new)
            .or_else(|| self.date.map(TaxPeriod::containing))
    }

    /// The request source, or `None` when neither `--request` nor
    /// `--gross`/`--contract` was given.
    pub fn request_source(&self) -> Option<RequestSource> {
        if let Some(path) = &self.request {
            return Some(if path.as_os_str() == "-" {
                RequestSource::Stdin
            } else {
                RequestSource::File(path.clone())
            });
        }

        let (gross, contract) = (self.gross?, self.contract.clone()?);
        let mut request = CalcRequest::new(gross, contract);
        if let Some(age) = self.age {
            request.age = age;
        }
        request.is_student = self.student;
        request.youth_tax_relief = self.youth_relief;
        request.creative_50 = self.creative;
        request.tax_deductible_fixed = self.costs_fixed;
        request.tax_deductible_percent = self.costs_percent;
        request.include_social_for_mandate = !self.no_social;

        Some(RequestSource::Flags(request))
    }
}
