//! Actual-day conventions with a fixed or leap-aware basis.

use super::YearFraction;
use crate::types::{Date, Frequency};

/// Mean length of the Gregorian year in days.
pub(super) const MEAN_YEAR_DAYS: f64 = 365.242;

/// Actual days over a fixed basis.
pub(super) fn act_fixed(d1: Date, d2: Date, basis: f64) -> YearFraction {
    YearFraction::new(d1.days_between(&d2) as f64, basis)
}

/// ACT/365L.
///
/// Annual coupons use 366 if 29 February falls in `(d1, d3]`; otherwise
/// the basis is 366 when the year of `d3` is a leap year. `d3` defaults
/// to `d2`.
pub(super) fn act_365_leap(
    d1: Date,
    d2: Date,
    d3: Option<Date>,
    freq: Option<Frequency>,
) -> YearFraction {
    let d3 = d3.unwrap_or(d2);
    let days = d1.days_between(&d2) as f64;

    let leap = if freq == Some(Frequency::Annual) {
        contains_feb_29(d1, d3)
    } else {
        d3.is_leap_year()
    };

    YearFraction::new(days, if leap { 366.0 } else { 365.0 })
}

/// True if 29 February lies in `(start, end]`.
fn contains_feb_29(start: Date, end: Date) -> bool {
    (start.year()..=end.year()).any(|year| {
        Date::from_ymd(year, 2, 29)
            .map(|feb29| feb29 > start && feb29 <= end)
            .unwrap_or(false)
    })
}
