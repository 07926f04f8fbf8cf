//! Zero rate curves.

use strike_core::daycounts::DayCountType;
use strike_core::types::Compounding;
use strike_core::Date;
use strike_math::interpolation::{Interpolator, LinearInterpolator};

use crate::error::{CurveError, CurveResult};
use crate::traits::{check_time_day_count, time_between, Curve};

fn dated_times(
    reference_date: Date,
    dates: &[Date],
    rates: &[f64],
    day_count: DayCountType,
) -> CurveResult<Vec<f64>> {
    check_time_day_count(day_count)?;
    if dates.len() != rates.len() {
        return Err(CurveError::invalid_input(format!(
            "dates and rates differ in length: {} vs {}",
            dates.len(),
            rates.len()
        )));
    }
    if dates.is_empty() {
        return Err(CurveError::InsufficientPoints {
            required: 1,
            got: 0,
        });
    }
    let ts: Vec<f64> = dates
        .iter()
        .map(|d| time_between(day_count, reference_date, *d))
        .collect();
    if ts[0] <= 0.0 {
        return Err(CurveError::invalid_input(format!(
            "first curve date {} must be after the reference date {reference_date}",
            dates[0]
        )));
    }
    for (i, w) in ts.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(CurveError::NonMonotonicTimes {
                index: i + 1,
                prev: w[0],
                current: w[1],
            });
        }
    }
    Ok(ts)
}

/// Zero rates at dates, linearly interpolated in time and held flat
/// outside the first and last dates.
#[derive(Debug, Clone)]
pub struct ZeroCurve {
    reference_date: Date,
    day_count: DayCountType,
    compounding: Compounding,
    rates: LinearInterpolator,
}

impl ZeroCurve {
    /// Creates a zero curve from `(date, rate)` pairs.
    pub fn new(
        reference_date: Date,
        dates: &[Date],
        rates: &[f64],
        compounding: Compounding,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        let ts = dated_times(reference_date, dates, rates, day_count)?;
        let rates = if ts.len() == 1 {
            LinearInterpolator::new(vec![ts[0], ts[0] + 1.0], vec![rates[0], rates[0]])?
        } else {
            LinearInterpolator::new(ts, rates.to_vec())?
        };
        Ok(Self {
            reference_date,
            day_count,
            compounding,
            rates,
        })
    }

    /// Interpolated zero rate at time `t` in the curve's compounding.
    pub fn rate(&self, t: f64) -> f64 {
        self.rates.interpolate(t)
    }
}

impl Curve for ZeroCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.compounding.discount_factor(self.rate(t), t)
    }

    fn day_count(&self) -> DayCountType {
        self.day_count
    }
}

/// Zero rates held constant on each interval `(t_{i-1}, t_i]`, taking the
/// rate of the interval's right end, and flat beyond the last date.
#[derive(Debug, Clone)]
pub struct PiecewiseFlatCurve {
    reference_date: Date,
    day_count: DayCountType,
    compounding: Compounding,
    times: Vec<f64>,
    rates: Vec<f64>,
}

impl PiecewiseFlatCurve {
    /// Creates a piecewise flat zero curve from `(date, rate)` pairs.
    pub fn new(
        reference_date: Date,
        dates: &[Date],
        rates: &[f64],
        compounding: Compounding,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        let times = dated_times(reference_date, dates, rates, day_count)?;
        Ok(Self {
            reference_date,
            day_count,
            compounding,
            times,
            rates: rates.to_vec(),
        })
    }

    /// Zero rate in force at time `t`.
    pub fn rate(&self, t: f64) -> f64 {
        let i = self.times.partition_point(|x| *x < t);
        self.rates[i.min(self.rates.len() - 1)]
    }
}

impl Curve for PiecewiseFlatCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.compounding.discount_factor(self.rate(t), t)
    }

    fn day_count(&self) -> DayCountType {
        self.day_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_zero_curve_interpolates_rates() {
        let anchor = d(2020, 1, 1);
        let curve = ZeroCurve::new(
            anchor,
            &[d(2021, 1, 1), d(2023, 1, 1)],
            &[0.02, 0.04],
            Compounding::Continuous,
            DayCountType::Act365F,
        )
        .unwrap();
        let t = 2.0;
        let t1 = curve.time(d(2021, 1, 1));
        let t2 = curve.time(d(2023, 1, 1));
        let expected = 0.02 + (t - t1) / (t2 - t1) * 0.02;
        assert_relative_eq!(curve.zero_rate(t, Compounding::Continuous), expected, epsilon = 1e-12);
        // Flat beyond the last date
        assert_relative_eq!(curve.zero_rate(10.0, Compounding::Continuous), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_piecewise_flat_steps() {
        let anchor = d(2020, 1, 1);
        let curve = PiecewiseFlatCurve::new(
            anchor,
            &[d(2021, 1, 1), d(2022, 1, 1)],
            &[0.01, 0.03],
            Compounding::Annual,
            DayCountType::Act365F,
        )
        .unwrap();
        assert_eq!(curve.rate(0.5), 0.01);
        assert_eq!(curve.rate(1.5), 0.03);
        assert_eq!(curve.rate(7.0), 0.03);
        assert_relative_eq!(curve.discount_factor(0.5), 1.01_f64.powf(-0.5), epsilon = 1e-15);
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let anchor = d(2020, 1, 1);
        let err = ZeroCurve::new(
            anchor,
            &[d(2022, 1, 1), d(2021, 1, 1)],
            &[0.02, 0.03],
            Compounding::Continuous,
            DayCountType::Act365F,
        )
        .unwrap_err();
        assert!(matches!(err, CurveError::NonMonotonicTimes { .. }));
    }
}
