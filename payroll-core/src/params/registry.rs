use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::{debug, error};

use crate::error::{CalculationError, ParameterError};
use crate::models::{TaxParameters, TaxPeriod};
use crate::params::builtin;

/// Registry of immutable [`TaxParameters`] tables, keyed by tax period.
///
/// Typical lifetime:
/// 1. Create with `ParameterRegistry::new()` (or start from `builtin()`).
/// 2. Call `register` once per table; each table is validated on the way in.
/// 3. Hand the registry to a [`PayrollEngine`](crate::PayrollEngine) and only
///    read from it afterwards.
///
/// Tables are shared behind `Arc`, so cloning a registry to swap in a new
/// tax year does not copy any table.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    tables: BTreeMap<TaxPeriod, Arc<TaxParameters>>,
}

impl ParameterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in table.
    pub fn builtin() -> Self {
        shared_builtin().clone()
    }

    /// Validate and register a table.
    ///
    /// A table already registered for the same period is replaced.
    ///
    /// # Errors
    /// [`ParameterError`] if the table fails [`TaxParameters::validate`].
    pub fn register(
        &mut self,
        params: TaxParameters,
    ) -> Result<(), ParameterError> {
        params.validate()?;
        debug!(
            period = %params.period,
            version = %params.version,
            "registering tax parameter table"
        );
        self.tables.insert(params.period, Arc::new(params));
        Ok(())
    }

    /// Table for `period`.
    ///
    /// # Errors
    /// [`CalculationError::UnsupportedPeriod`] if no table is registered.
    pub fn parameters_for(
        &self,
        period: TaxPeriod,
    ) -> Result<&TaxParameters, CalculationError> {
        self.tables
            .get(&period)
            .map(Arc::as_ref)
            .ok_or(CalculationError::UnsupportedPeriod(period))
    }

    /// Every registered period, ascending.
    pub fn available_periods(&self) -> Vec<TaxPeriod> {
        self.tables.keys().copied().collect()
    }

    /// Most recent registered period.
    pub fn latest(&self) -> Option<TaxPeriod> {
        self.tables.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn shared_builtin() -> &'static ParameterRegistry {
    static BUILTIN: OnceLock<ParameterRegistry> = OnceLock::new();
    BUILTIN.get_or_init(|| {
        let mut registry = ParameterRegistry::new();
        for params in builtin::all() {
            let period = params.period;
            if let Err(err) = registry.register(params) {
                // Left unregistered; lookups report UnsupportedPeriod.
                error!(%period, error = %err, "built-in tax parameter table is invalid");
            }
        }
        registry
    })
}
