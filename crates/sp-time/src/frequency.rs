//! `Frequency` — how often observations or payments recur.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sp_core::Error;

/// Observation / payment frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every month end.
    Monthly,
    /// Every quarter end (March, June, September, December).
    Quarterly,
    /// Every half-year end (June, December).
    Semiannual,
    /// Every year end.
    Annual,
}

impl Frequency {
    /// Number of periods per year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Semiannual => 2,
            Frequency::Annual => 1,
        }
    }

    /// Length of one period in months.
    pub fn months(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Whether a period of this frequency ends with calendar month `month`.
    pub(crate) fn ends_in_month(&self, month: u32) -> bool {
        month % self.months() == 0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Semiannual => "semiannual",
            Frequency::Annual => "yearly",
        };
        f.write_str(s)
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "semiannual" | "semi-annual" => Ok(Frequency::Semiannual),
            "yearly" | "annual" => Ok(Frequency::Annual),
            other => Err(Error::InvalidArgument(format!(
                "unsupported frequency '{other}'"
            ))),
        }
    }
}
