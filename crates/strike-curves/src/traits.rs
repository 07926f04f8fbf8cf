//! Core traits for discount curves.

use std::sync::Arc;

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::{Compounding, Frequency};
use strike_core::Date;

use crate::curves::ShiftedCurve;
use crate::error::{CurveError, CurveResult};

/// Year fraction under `day_count`, for conventions that need no reference
/// period.
///
/// Curves only accept such conventions, so the fallback to ACT/365F is not
/// reached in practice.
pub(crate) fn time_between(day_count: DayCountType, d1: Date, d2: Date) -> f64 {
    day_count
        .year_frac(d1, d2, None, None)
        .map_or_else(|_| d1.days_between(&d2) as f64 / 365.0, |yf| yf.alpha)
}

/// Rejects day counts that need a reference period to measure curve time.
pub(crate) fn check_time_day_count(day_count: DayCountType) -> CurveResult<()> {
    if day_count == DayCountType::ActActIcma {
        return Err(CurveError::invalid_input(
            "ACT/ACT ICMA needs a reference period and cannot measure curve time",
        ));
    }
    Ok(())
}

/// The core trait for discount curves.
///
/// A curve maps time `t` (years from the reference date under the curve's
/// own day count) to a discount factor with `df(0) = 1`. Everything else
/// (zero, forward and swap rates, date queries) derives from that.
///
/// # Example
///
/// ```rust
/// use strike_core::daycounts::DayCountType;
/// use strike_core::types::Compounding;
/// use strike_core::Date;
/// use strike_curves::curves::FlatCurve;
/// use strike_curves::Curve;
///
/// let anchor = Date::from_ymd(2019, 1, 1).unwrap();
/// let curve = FlatCurve::new(anchor, 0.05, Compounding::Continuous, DayCountType::ActActIsda).unwrap();
/// let df = curve.df(Date::from_ymd(2020, 1, 1).unwrap());
/// assert!((df - 0.95122942).abs() < 1e-8);
/// ```
pub trait Curve: Send + Sync {
    /// Returns the curve's reference (valuation) date.
    fn reference_date(&self) -> Date;

    /// Returns the discount factor at time `t` in years. Returns 1.0 for
    /// `t <= 0`.
    fn discount_factor(&self, t: f64) -> f64;

    /// Day count that converts dates to curve time.
    fn day_count(&self) -> DayCountType {
        DayCountType::Act365F
    }

    /// Curve time of `date`.
    fn time(&self, date: Date) -> f64 {
        time_between(self.day_count(), self.reference_date(), date)
    }

    /// Discount factor for a date.
    fn df(&self, date: Date) -> f64 {
        self.discount_factor(self.time(date))
    }

    /// Zero rate at time `t` with the given compounding.
    fn zero_rate(&self, t: f64, compounding: Compounding) -> f64 {
        compounding.zero_rate(self.discount_factor(t), t)
    }

    /// Zero rate to `date`, measuring time with `day_count`.
    fn zero_rate_at(
        &self,
        date: Date,
        compounding: Compounding,
        day_count: DayCountType,
    ) -> CurveResult<f64> {
        let t = day_count.year_frac(self.reference_date(), date, None, None)?.alpha;
        Ok(compounding.zero_rate(self.df(date), t))
    }

    /// Simply-compounded forward rate between times `t1` and `t2`.
    fn forward_rate(&self, t1: f64, t2: f64) -> f64 {
        if t2 <= t1 {
            return self.instantaneous_forward(t1);
        }
        (self.discount_factor(t1) / self.discount_factor(t2) - 1.0) / (t2 - t1)
    }

    /// Simply-compounded forward rate between two dates, accruing with
    /// `day_count`.
    fn fwd_rate(&self, d1: Date, d2: Date, day_count: DayCountType) -> CurveResult<f64> {
        let alpha = day_count.year_frac(d1, d2, None, None)?.alpha;
        if alpha <= 0.0 {
            return Err(CurveError::invalid_input(format!(
                "forward period {d1} to {d2} has non-positive accrual"
            )));
        }
        Ok((self.df(d1) / self.df(d2) - 1.0) / alpha)
    }

    /// Instantaneous forward rate `-d ln df / dt` at time `t`.
    fn instantaneous_forward(&self, t: f64) -> f64 {
        let h = 1e-4;
        let t0 = (t - h).max(0.0);
        let t1 = t0 + 2.0 * h;
        -(self.discount_factor(t1).ln() - self.discount_factor(t0).ln()) / (t1 - t0)
    }

    /// Par rate of a fixed-for-floating swap with a weekend calendar,
    /// modified-following rolling and backward generation.
    ///
    /// `(df(effective) - df(maturity)) / Σ α_i df(pay_i)`
    fn swap_rate(
        &self,
        effective: Date,
        maturity: Date,
        frequency: Frequency,
        day_count: DayCountType,
    ) -> CurveResult<f64> {
        let schedule = Schedule::generate(
            effective,
            maturity,
            frequency,
            CalendarType::Weekend,
            BusinessDayConvention::ModifiedFollowing,
            DateGenRule::Backward,
        )?;
        swap_rate_on(self, &schedule, day_count)
    }
}

/// Par rate of a fixed leg on an explicit schedule.
pub fn swap_rate_on<C: Curve + ?Sized>(
    curve: &C,
    schedule: &Schedule,
    day_count: DayCountType,
) -> CurveResult<f64> {
    let dates = schedule.dates();
    let alphas = schedule.year_fractions(day_count)?;
    let annuity: f64 = alphas
        .iter()
        .zip(&dates[1..])
        .map(|(alpha, pay)| alpha * curve.df(*pay))
        .sum();
    if annuity <= 0.0 {
        return Err(CurveError::invalid_input("swap annuity is not positive"));
    }
    let first = dates[0];
    let last = dates[dates.len() - 1];
    Ok((curve.df(first) - curve.df(last)) / annuity)
}

/// Curves that can be cloned into a parallel-shifted copy.
pub trait BumpableCurve: Curve + Clone + Sized {
    /// Returns a curve with every discount factor multiplied by
    /// `exp(-shift * t)`.
    fn bump(&self, shift: f64) -> ShiftedCurve<Self> {
        ShiftedCurve::new(self.clone(), shift)
    }
}

impl<C: Curve + Clone> BumpableCurve for C {}

impl<C: Curve + ?Sized> Curve for &C {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
    fn discount_factor(&self, t: f64) -> f64 {
        (**self).discount_factor(t)
    }
    fn day_count(&self) -> DayCountType {
        (**self).day_count()
    }
}

impl<C: Curve + ?Sized> Curve for Arc<C> {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
    fn discount_factor(&self, t: f64) -> f64 {
        (**self).discount_factor(t)
    }
    fn day_count(&self) -> DayCountType {
        (**self).day_count()
    }
}

impl<C: Curve + ?Sized> Curve for Box<C> {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
    fn discount_factor(&self, t: f64) -> f64 {
        (**self).discount_factor(t)
    }
    fn day_count(&self) -> DayCountType {
        (**self).day_count()
    }
}
