//! `Schedule` — observation dates between a start and an end date.
//!
//! Dates are the period ends of the requested [`Frequency`] that fall inside
//! `[start, end]`; the last one is always moved onto `end` so that the final
//! observation coincides with maturity.

use chrono::{Datelike, Duration};
use sp_core::errors::{Error, Result};
use sp_core::Time;

use crate::{Date, DayCount, Frequency};

/// An ordered sequence of observation / payment dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    start: Date,
    end: Date,
    frequency: Frequency,
    dates: Vec<Date>,
}

impl Schedule {
    /// Build the schedule of `frequency` period ends between `start` and `end`.
    ///
    /// Fails with [`Error::Date`] when `start` is after `end`.
    pub fn new(start: Date, end: Date, frequency: Frequency) -> Result<Self> {
        if start > end {
            return Err(Error::Date(format!(
                "schedule start {start} is after end {end}"
            )));
        }

        let mut dates = Vec::new();
        let mut cursor = month_end(start.year(), start.month());
        while cursor <= end {
            if cursor >= start && frequency.ends_in_month(cursor.month()) {
                dates.push(cursor);
            }
            cursor = next_month_end(cursor);
        }

        match dates.last_mut() {
            Some(last) => *last = end,
            None => dates.push(end),
        }

        Ok(Self {
            start,
            end,
            frequency,
            dates,
        })
    }

    /// All dates in the schedule.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always `false`: a schedule holds at least its end date.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First date of the period covered.
    pub fn start(&self) -> Date {
        self.start
    }

    /// Last date of the period covered.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Frequency the schedule was generated with.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Year fractions from `reference` to each date under `day_count`.
    pub fn times_from(&self, reference: Date, day_count: DayCount) -> Vec<Time> {
        self.dates
            .iter()
            .map(|&d| day_count.year_fraction(reference, d))
            .collect()
    }

    /// Latest schedule date on or before `date`, if any.
    pub fn last_on_or_before(&self, date: Date) -> Option<Date> {
        self.dates.iter().rev().find(|&&d| d <= date).copied()
    }
}

fn month_end(year: i32, month: u32) -> Date {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    // the first of any month in chrono's range is valid
    Date::from_ymd_opt(ny, nm, 1).unwrap_or(Date::MAX) - Duration::days(1)
}

fn next_month_end(d: Date) -> Date {
    let (y, m) = if d.month() == 12 {
        (d.year() + 1, 1)
    } else {
        (d.year(), d.month() + 1)
    };
    month_end(y, m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_end_handles_leap_years() {
        assert_eq!(month_end(2024, 2), date(2024, 2, 29));
        assert_eq!(month_end(2025, 2), date(2025, 2, 28));
        assert_eq!(month_end(2025, 12), date(2025, 12, 31));
    }

    #[test]
    fn short_range_collapses_to_end() {
        let s = Schedule::new(date(2025, 1, 5), date(2025, 1, 20), Frequency::Monthly).unwrap();
        assert_eq!(s.dates(), &[date(2025, 1, 20)]);
    }

    #[test]
    fn last_on_or_before() {
        let s = Schedule::new(date(2025, 1, 1), date(2026, 1, 1), Frequency::Quarterly).unwrap();
        assert_eq!(s.last_on_or_before(date(2025, 8, 1)), Some(date(2025, 6, 30)));
        assert_eq!(s.last_on_or_before(date(2025, 2, 1)), None);
    }
}
