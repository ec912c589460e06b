//! Day-count conventions.
//!
//! A day count turns a pair of dates into a fraction of a year. Option
//! maturities use [`DayCount::Actual365Fixed`]; fixed-income cashflows
//! default to [`DayCount::Actual36525`].

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use sp_core::{Error, Real, Time};

use crate::Date;

/// A convention for counting the fraction of a year between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCount {
    /// `actual_days / 365`
    Actual365Fixed,
    /// `actual_days / 360`
    Actual360,
    /// `actual_days / 365.25`
    #[default]
    Actual36525,
    /// 30/360 with both day-of-month values capped at 30.
    Thirty360,
}

impl DayCount {
    /// Number of days between `start` and `end` under this convention.
    ///
    /// Negative when `end` precedes `start`.
    pub fn day_count(&self, start: Date, end: Date) -> i64 {
        match self {
            DayCount::Thirty360 => {
                let d1 = start.day().min(30) as i64;
                let d2 = end.day().min(30) as i64;
                360 * (end.year() - start.year()) as i64
                    + 30 * (end.month() as i64 - start.month() as i64)
                    + (d2 - d1)
            }
            _ => (end - start).num_days(),
        }
    }

    /// Fraction of a year between `start` and `end`.
    pub fn year_fraction(&self, start: Date, end: Date) -> Time {
        let days = self.day_count(start, end) as Real;
        match self {
            DayCount::Actual365Fixed => days / 365.0,
            DayCount::Actual360 | DayCount::Thirty360 => days / 360.0,
            DayCount::Actual36525 => days / 365.25,
        }
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayCount::Actual365Fixed => "act/365",
            DayCount::Actual360 => "act/360",
            DayCount::Actual36525 => "act/365.25",
            DayCount::Thirty360 => "30/360",
        };
        f.write_str(s)
    }
}

impl FromStr for DayCount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "act/365" | "actual/365" | "act/365f" => Ok(DayCount::Actual365Fixed),
            "act/360" | "actual/360" => Ok(DayCount::Actual360),
            "act/365.25" | "actual/365.25" => Ok(DayCount::Actual36525),
            "30/360" | "thirty/360" => Ok(DayCount::Thirty360),
            other => Err(Error::InvalidArgument(format!(
                "unsupported day-count convention '{other}'"
            ))),
        }
    }
}
