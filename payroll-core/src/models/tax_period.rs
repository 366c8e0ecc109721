use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The tax year a parameter table applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxPeriod(i32);

impl TaxPeriod {
    pub const fn new(tax_year: i32) -> Self {
        Self(tax_year)
    }

    /// Period covering the given calendar date.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use payroll_core::TaxPeriod;
    ///
    /// let date = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
    /// assert_eq!(TaxPeriod::containing(date), TaxPeriod::new(2025));
    /// ```
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.year())
    }

    pub fn tax_year(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaxPeriod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
