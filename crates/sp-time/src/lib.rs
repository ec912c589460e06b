//! # sp-time
//!
//! Date arithmetic consumed by the pricing engines: day-count conventions,
//! observation frequencies and schedule generation.
//!
//! Dates are plain [`chrono::NaiveDate`] values, re-exported as [`Date`].

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Day-count conventions and year fractions.
pub mod day_count;
/// Observation / payment frequencies.
pub mod frequency;
/// Observation-date schedules.
pub mod schedule;

/// Calendar date used throughout the pricer.
pub type Date = chrono::NaiveDate;

pub use day_count::DayCount;
pub use frequency::Frequency;
pub use schedule::Schedule;
