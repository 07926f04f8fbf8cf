//! 30/360 conventions.
//!
//! All variants share the formula
//!
//! $$\text{Days} = 360 (Y_2 - Y_1) + 30 (M_2 - M_1) + (D_2 - D_1)$$
//!
//! and differ only in how the day-of-month values are capped.

use super::YearFraction;
use crate::types::Date;

fn thirty_days(y1: i32, m1: u32, d1: u32, y2: i32, m2: u32, d2: u32) -> f64 {
    f64::from(360 * (y2 - y1))
        + 30.0 * (f64::from(m2) - f64::from(m1))
        + (f64::from(d2) - f64::from(d1))
}

#[inline]
fn is_last_day_of_february(date: Date) -> bool {
    date.month() == 2 && date.is_end_of_month()
}

/// 30/360 Bond Basis: D1 = 31 becomes 30; D2 = 31 becomes 30 only if D1 is
/// now 30.
pub(super) fn bond_basis(start: Date, end: Date) -> YearFraction {
    let mut d1 = start.day();
    let mut d2 = end.day();
    if d1 == 31 {
        d1 = 30;
    }
    if d2 == 31 && d1 == 30 {
        d2 = 30;
    }
    let days = thirty_days(start.year(), start.month(), d1, end.year(), end.month(), d2);
    YearFraction::new(days, 360.0)
}

/// 30E/360 Eurobond: both 31sts are capped to 30.
pub(super) fn eurobond(start: Date, end: Date) -> YearFraction {
    let d1 = start.day().min(30);
    let d2 = end.day().min(30);
    let days = thirty_days(start.year(), start.month(), d1, end.year(), end.month(), d2);
    YearFraction::new(days, 360.0)
}

/// 30E/360 ISDA: month ends become 30, except an end date in February that
/// is the maturity date `d3`.
pub(super) fn e_isda(start: Date, end: Date, maturity: Option<Date>) -> YearFraction {
    let d1 = if start.is_end_of_month() { 30 } else { start.day() };
    let end_is_maturity = maturity == Some(end);
    let d2 = if end.is_end_of_month() && !(end_is_maturity && is_last_day_of_february(end)) {
        30
    } else {
        end.day()
    };
    let days = thirty_days(start.year(), start.month(), d1, end.year(), end.month(), d2);
    YearFraction::new(days, 360.0)
}

/// 30E+/360: D1 = 31 becomes 30; D2 = 31 rolls to the 1st of the next
/// month.
pub(super) fn e_plus(start: Date, end: Date) -> YearFraction {
    let d1 = start.day().min(30);
    let (mut y2, mut m2, mut d2) = (end.year(), end.month(), end.day());
    if d2 == 31 {
        d2 = 1;
        m2 += 1;
        if m2 == 13 {
            m2 = 1;
            y2 += 1;
        }
    }
    let days = thirty_days(start.year(), start.month(), d1, y2, m2, d2);
    YearFraction::new(days, 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_bond_basis() {
        assert_eq!(bond_basis(d(2020, 1, 31), d(2020, 3, 31)).numerator, 60.0);
        // D1 = 30 not reached: D2 stays 31
        assert_eq!(bond_basis(d(2020, 1, 15), d(2020, 3, 31)).numerator, 76.0);
    }

    #[test]
    fn test_eurobond() {
        assert_eq!(eurobond(d(2020, 1, 15), d(2020, 3, 31)).numerator, 75.0);
        assert_relative_eq!(eurobond(d(2021, 3, 15), d(2022, 3, 15)).alpha, 1.0);
    }

    #[test]
    fn test_e_isda_february() {
        // Feb month end counts as 30 unless it is the maturity
        assert_eq!(e_isda(d(2020, 2, 29), d(2020, 8, 31), None).numerator, 180.0);
        assert_eq!(e_isda(d(2019, 8, 31), d(2020, 2, 29), None).numerator, 180.0);
        assert_eq!(
            e_isda(d(2019, 8, 31), d(2020, 2, 29), Some(d(2020, 2, 29))).numerator,
            179.0
        );
    }

    #[test]
    fn test_e_plus_rolls_forward() {
        assert_eq!(e_plus(d(2020, 1, 15), d(2020, 3, 31)).numerator, 76.0);
        assert_eq!(e_plus(d(2020, 12, 1), d(2020, 12, 31)).numerator, 30.0);
    }
}
