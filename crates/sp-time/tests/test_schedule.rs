//! Integration tests for observation schedules and year fractions.

use sp_core::Error;
use sp_time::{Date, DayCount, Frequency, Schedule};

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

/// Assert that the schedule dates match `expected` exactly.
fn check_dates(s: &Schedule, expected: &[Date]) {
    assert_eq!(
        s.len(),
        expected.len(),
        "expected {} dates, found {}.\n  actual:   {:?}\n  expected: {:?}",
        expected.len(),
        s.len(),
        s.dates(),
        expected,
    );
    for (i, (found, exp)) in s.dates().iter().zip(expected).enumerate() {
        assert_eq!(found, exp, "at index {i}: expected {exp}, found {found}");
    }
}

#[test]
fn quarterly_schedule_ends_on_maturity() {
    let s = Schedule::new(date(2025, 1, 1), date(2026, 1, 1), Frequency::Quarterly).unwrap();
    // the December quarter end is replaced by the maturity date
    check_dates(
        &s,
        &[
            date(2025, 3, 31),
            date(2025, 6, 30),
            date(2025, 9, 30),
            date(2026, 1, 1),
        ],
    );
}

#[test]
fn monthly_schedule() {
    let s = Schedule::new(date(2025, 1, 15), date(2025, 6, 30), Frequency::Monthly).unwrap();
    check_dates(
        &s,
        &[
            date(2025, 1, 31),
            date(2025, 2, 28),
            date(2025, 3, 31),
            date(2025, 4, 30),
            date(2025, 5, 31),
            date(2025, 6, 30),
        ],
    );
}

#[test]
fn yearly_schedule_over_three_years() {
    let s = Schedule::new(date(2025, 3, 1), date(2028, 3, 1), Frequency::Annual).unwrap();
    check_dates(
        &s,
        &[date(2025, 12, 31), date(2026, 12, 31), date(2028, 3, 1)],
    );
}

#[test]
fn start_after_end_is_rejected() {
    let err = Schedule::new(date(2026, 1, 1), date(2025, 1, 1), Frequency::Monthly).unwrap_err();
    assert!(matches!(err, Error::Date(_)), "unexpected error {err:?}");
}

#[test]
fn observation_times_use_day_count() {
    let s = Schedule::new(date(2025, 1, 1), date(2026, 1, 1), Frequency::Semiannual).unwrap();
    let times = s.times_from(date(2025, 1, 1), DayCount::Actual365Fixed);
    assert_eq!(times.len(), 2);
    assert!((times[0] - 180.0 / 365.0).abs() < 1e-12, "t0 = {}", times[0]);
    assert!((times[1] - 1.0).abs() < 1e-12, "t1 = {}", times[1]);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn schedule_is_sorted_and_ends_on_maturity(
            offset in 0i64..2000,
            length in 0i64..3000,
            freq in prop::sample::select(vec![
                Frequency::Monthly,
                Frequency::Quarterly,
                Frequency::Semiannual,
                Frequency::Annual,
            ]),
        ) {
            let start = date(2020, 1, 1) + chrono::Duration::days(offset);
            let end = start + chrono::Duration::days(length);
            let s = Schedule::new(start, end, freq).unwrap();
            prop_assert!(!s.is_empty());
            prop_assert_eq!(*s.dates().last().unwrap(), end);
            prop_assert!(s.dates().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(s.dates().iter().all(|&d| d >= start && d <= end));
        }
    }
}
