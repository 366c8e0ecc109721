use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of contract types the engine knows how to price.
///
/// Which rules apply to each tag is decided by the parameter table, never by
/// matching on the variant inside a calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    /// Contract of employment.
    Employment,
    /// Civil contract of mandate.
    Mandate,
    /// Contract for a specific piece of work.
    Work,
}

impl ContractType {
    pub const ALL: [ContractType; 3] = [Self::Employment, Self::Mandate, Self::Work];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::Mandate => "mandate",
            Self::Work => "work",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employment" => Some(Self::Employment),
            "mandate" => Some(Self::Mandate),
            "work" => Some(Self::Work),
            _ => None,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
