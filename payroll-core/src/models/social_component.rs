use std::fmt;

use serde::{Deserialize, Serialize};

/// Employee-side social insurance components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialComponent {
    Pension,
    Disability,
    Sickness,
}

impl SocialComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pension => "pension",
            Self::Disability => "disability",
            Self::Sickness => "sickness",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pension" => Some(Self::Pension),
            "disability" => Some(Self::Disability),
            "sickness" => Some(Self::Sickness),
            _ => None,
        }
    }
}

impl fmt::Display for SocialComponent {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
