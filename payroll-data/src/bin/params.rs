use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use payroll_core::TaxPeriod;
use payroll_data::ParameterTableLoader;
use tracing_subscriber::EnvFilter;

/// Validate a directory of payroll parameter tables.
///
/// The directory must contain:
/// - tax_years.csv: one row of scalar settings per tax year
/// - contribution_rates.csv: social component rates
/// - contract_rules.csv: per-contract rules
/// - pit_brackets.csv: progressive PIT brackets (empty upper for the top one)
#[derive(Parser, Debug)]
#[command(name = "payroll-params")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the parameter CSV files
    #[arg(short, long)]
    dir: PathBuf,

    /// Only report this tax year
    #[arg(short, long)]
    year: Option<i32>,

    /// Print the assembled tables as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let registry = ParameterTableLoader::load_registry(&args.dir)
        .with_context(|| format!("Failed to load parameter tables from: {}", args.dir.display()))?;

    let periods = match args.year {
        Some(year) => vec![TaxPeriod::new(year)],
        None => registry.available_periods(),
    };
    if periods.is_empty() {
        bail!("No tax years found in: {}", args.dir.display());
    }

    for period in periods {
        let params = registry
            .parameters_for(period)
            .with_context(|| format!("Tax year {period} is not defined in {}", args.dir.display()))?;

        if args.json {
            let json = serde_json::to_string_pretty(params)
                .context("Failed to serialize parameter table")?;
            println!("{json}");
        } else {
            println!(
                "{period}: version {}, {} contribution rates, {} contracts, {} PIT brackets",
                params.version,
                params.contribution_rates.len(),
                params.contracts.len(),
                params.pit_brackets.len()
            );
        }
    }

    Ok(())
}
