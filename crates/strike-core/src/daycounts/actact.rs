//! Actual/Actual conventions.

use super::YearFraction;
use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// ACT/ACT ISDA: the interval is split at calendar year boundaries and each
/// piece is divided by the length of its own year.
///
/// Requires `d1 < d2`.
pub(super) fn isda(d1: Date, d2: Date) -> YearFraction {
    let days = d1.days_between(&d2) as f64;
    let (y1, y2) = (d1.year(), d2.year());

    if y1 == y2 {
        return YearFraction::new(days, f64::from(d1.days_in_year()));
    }

    // Days from d1 to Jan 1 of the following year, and Jan 1 of y2 to d2.
    let head = f64::from(d1.days_in_year() - d1.day_of_year() + 1);
    let tail = f64::from(d2.day_of_year() - 1);
    let alpha = head / f64::from(d1.days_in_year())
        + f64::from(y2 - y1 - 1)
        + tail / f64::from(d2.days_in_year());

    YearFraction {
        alpha,
        numerator: days,
        denominator: days / alpha,
    }
}

/// ACT/ACT ICMA: actual days over `freq` times the length of the reference
/// period `[d1, d3]`.
pub(super) fn icma(
    d1: Date,
    d2: Date,
    d3: Option<Date>,
    freq: Option<Frequency>,
) -> CoreResult<YearFraction> {
    let d3 = d3.ok_or_else(|| CoreError::day_count("ACT/ACT ICMA requires the period end date"))?;
    let freq = freq.ok_or_else(|| CoreError::day_count("ACT/ACT ICMA requires a frequency"))?;
    if freq.is_zero() {
        return Err(CoreError::day_count(
            "ACT/ACT ICMA requires a periodic frequency",
        ));
    }
    let period = d1.days_between(&d3);
    if period <= 0 {
        return Err(CoreError::day_count(format!(
            "reference period end {d3} must be after {d1}"
        )));
    }
    let f = f64::from(freq.periods_per_year());
    Ok(YearFraction::new(
        d1.days_between(&d2) as f64,
        f * period as f64,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_isda_within_year() {
        let yf = isda(d(2020, 1, 1), d(2020, 7, 1));
        assert_relative_eq!(yf.alpha, 182.0 / 366.0, epsilon = 1e-15);
    }

    #[test]
    fn test_isda_across_years() {
        // ISDA example: 2003-11-01 to 2004-05-01
        let yf = isda(d(2003, 11, 1), d(2004, 5, 1));
        assert_relative_eq!(yf.alpha, 61.0 / 365.0 + 121.0 / 366.0, epsilon = 1e-15);
        assert_eq!(yf.numerator, 182.0);
    }

    #[test]
    fn test_isda_multi_year() {
        let yf = isda(d(2019, 7, 1), d(2022, 7, 1));
        let expected = 184.0 / 365.0 + 2.0 + 181.0 / 365.0;
        assert_relative_eq!(yf.alpha, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_icma_semi_annual() {
        // ISDA example: 2003-11-01 to 2004-05-01, semi-annual, full period
        let yf = icma(
            d(2003, 11, 1),
            d(2004, 5, 1),
            Some(d(2004, 5, 1)),
            Some(Frequency::SemiAnnual),
        )
        .unwrap();
        assert_relative_eq!(yf.alpha, 0.5, epsilon = 1e-15);

        let partial = icma(
            d(2003, 11, 1),
            d(2004, 2, 1),
            Some(d(2004, 5, 1)),
            Some(Frequency::SemiAnnual),
        )
        .unwrap();
        assert_relative_eq!(partial.alpha, 92.0 / (2.0 * 182.0), epsilon = 1e-15);
    }

    #[test]
    fn test_icma_errors() {
        assert!(icma(d(2020, 1, 1), d(2020, 2, 1), Some(d(2020, 7, 1)), None).is_err());
        assert!(icma(
            d(2020, 1, 1),
            d(2020, 2, 1),
            Some(d(2020, 7, 1)),
            Some(Frequency::Zero)
        )
        .is_err());
    }
}
