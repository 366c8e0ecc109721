//! Request handling for `payroll-calc`: builds the engine, runs one request,
//! and maps the outcome to a JSON body and an exit code.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use payroll_core::api::{CalcRequest, CalcResponse, ErrorKind, ErrorResponse};
use payroll_core::{
    CalculationError, CalculationInput, ParameterRegistry, PayrollEngine, TaxPeriod,
};
use payroll_data::ParameterTableLoader;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::cli::RequestSource;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;

/// JSON body to print and the process exit code that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: Value,
    pub exit_code: u8,
}

impl Reply {
    fn success(body: Value) -> Self {
        Self {
            body,
            exit_code: EXIT_OK,
        }
    }
}

impl From<ErrorResponse> for Reply {
    fn from(error: ErrorResponse) -> Self {
        let exit_code = match error.kind {
            ErrorKind::Validation => EXIT_INVALID_INPUT,
            ErrorKind::Configuration | ErrorKind::Internal => EXIT_FAILURE,
        };
        Self {
            body: json!(error),
            exit_code,
        }
    }
}

/// Builds the engine from a parameter directory, or the built-in tables.
///
/// Without `default_period` the newest loaded year is the default.
///
/// # Errors
///
/// Fails if the directory cannot be loaded, holds no tables, or does not
/// cover `default_period`.
pub fn build_engine(
    params_dir: Option<&Path>,
    default_period: Option<TaxPeriod>,
) -> Result<PayrollEngine> {
    let registry = match params_dir {
        Some(dir) => ParameterTableLoader::load_registry(dir)
            .with_context(|| format!("Failed to load parameter tables from: {}", dir.display()))?,
        None => ParameterRegistry::builtin(),
    };

    let Some(latest) = registry.latest() else {
        bail!("No tax parameter tables available");
    };
    let period = default_period.unwrap_or(latest);
    registry
        .parameters_for(period)
        .with_context(|| format!("Default tax year {period} has no parameter table"))?;

    info!(%period, available = ?registry.available_periods(), "payroll engine ready");
    Ok(PayrollEngine::new(registry, period))
}

/// Parses a JSON request. Malformed JSON is a validation failure.
pub fn parse_request(json: &str) -> Result<CalcRequest, ErrorResponse> {
    serde_json::from_str(json).map_err(|err| {
        debug!(error = %err, "malformed request");
        ErrorResponse::malformed(format!("malformed request: {err}"))
    })
}

/// Reads the request from its source.
///
/// # Errors
///
/// Fails only when the file or stdin cannot be read. Bad content is
/// reported later as a validation reply.
pub fn read_request(
    source: RequestSource,
    stdin: &mut dyn Read,
) -> Result<std::result::Result<CalcRequest, ErrorResponse>> {
    let json = match source {
        RequestSource::Flags(request) => return Ok(Ok(request)),
        RequestSource::Stdin => {
            let mut json = String::new();
            stdin
                .read_to_string(&mut json)
                .context("Failed to read request from stdin")?;
            json
        }
        RequestSource::File(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?,
    };
    Ok(parse_request(&json))
}

/// Runs one request and renders the reply.
///
/// With `detailed`, the body is `{ "result": ..., "breakdown": ... }`;
/// otherwise it is the plain response object.
pub fn respond(
    engine: &PayrollEngine,
    request: CalcRequest,
    detailed: bool,
) -> Reply {
    let input = match CalculationInput::try_from(request) {
        Ok(input) => input,
        Err(err) => return Reply::from(ErrorResponse::from(&CalculationError::from(err))),
    };

    match engine.calculate_detailed(&input) {
        Ok(calculation) => {
            let response = CalcResponse::from(calculation.result);
            if detailed {
                Reply::success(json!({
                    "result": response,
                    "breakdown": calculation.breakdown,
                }))
            } else {
                Reply::success(json!(response))
            }
        }
        Err(err) => Reply::from(ErrorResponse::from(&err)),
    }
}

/// Health report: the periods the engine can price.
pub fn check(engine: &PayrollEngine) -> Reply {
    let periods: Vec<i32> = engine
        .registry()
        .available_periods()
        .iter()
        .map(TaxPeriod::tax_year)
        .collect();

    Reply::success(json!({
        "status": "ok",
        "default_tax_year": engine.default_period().tax_year(),
        "tax_years": periods,
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // respond tests
    // =========================================================================

    #[test]
    fn respond_success_prints_response_fields() {
        let reply = respond(
            &PayrollEngine::builtin(),
            CalcRequest::new(dec!(5000.00), "employment"),
            false,
        );

        assert_eq!(reply.exit_code, EXIT_OK);
        assert_eq!(reply.body["net"], json!(3438.51));
        assert_eq!(reply.body["pit_base"], json!(4064.0));
    }

    #[test]
    fn respond_detailed_includes_breakdown() {
        let reply = respond(
            &PayrollEngine::builtin(),
            CalcRequest::new(dec!(5000.00), "employment"),
            true,
        );

        assert_eq!(reply.body["result"]["health"], json!(388.31));
        assert_eq!(reply.body["breakdown"]["parameters_version"], json!("PL-2025.1"));
        assert_eq!(reply.body["breakdown"]["cost_mode"]["mode"], json!("contract_default"));
    }

    #[test]
    fn respond_unknown_contract_is_invalid_input() {
        let reply = respond(
            &PayrollEngine::builtin(),
            CalcRequest::new(dec!(5000.00), "b2b"),
            false,
        );

        assert_eq!(reply.exit_code, EXIT_INVALID_INPUT);
        assert_eq!(reply.body["kind"], json!("validation"));
        assert_eq!(reply.body["field"], json!("contract"));
    }

    #[test]
    fn respond_unsupported_year_is_failure() {
        let request = CalcRequest {
            tax_year: Some(2019),
            ..CalcRequest::new(dec!(5000.00), "employment")
        };

        let reply = respond(&PayrollEngine::builtin(), request, false);

        assert_eq!(reply.exit_code, EXIT_FAILURE);
        assert_eq!(reply.body["kind"], json!("configuration"));
    }

    // =========================================================================
    // parse_request and engine tests
    // =========================================================================

    #[test]
    fn parse_request_malformed_json_is_validation_error() {
        let err = parse_request("{ \"gross\": ").unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.error.starts_with("malformed request:"));
    }

    #[test]
    fn parse_request_missing_contract_is_validation_error() {
        let err = parse_request(r#"{ "gross": 5000 }"#).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn read_request_from_stdin() {
        let mut stdin = r#"{ "gross": 7000, "contract": "work" }"#.as_bytes();

        let request = read_request(RequestSource::Stdin, &mut stdin)
            .unwrap()
            .unwrap();

        assert_eq!(request, CalcRequest::new(dec!(7000), "work"));
    }

    #[test]
    fn build_engine_rejects_year_without_table() {
        let result = build_engine(None, Some(TaxPeriod::new(2019)));

        assert!(result.is_err());
    }

    #[test]
    fn check_reports_builtin_years() {
        let reply = check(&build_engine(None, None).unwrap());

        assert_eq!(
            reply.body,
            json!({ "status": "ok", "default_tax_year": 2025, "tax_years": [2025] })
        );
    }
}
