//! The volatility surface trait and shared expiry interpolation.

use std::sync::Arc;

use strike_core::Date;

/// Year fraction between two dates on ACT/365F, the expiry clock of all
/// surfaces.
pub fn year_fraction(from: Date, to: Date) -> f64 {
    from.days_between(&to) as f64 / 365.0
}

/// Maps `(strike, expiry)` to a Black volatility.
pub trait VolSurface: Send + Sync {
    /// Valuation date of the surface.
    fn reference_date(&self) -> Date;

    /// Black volatility at `strike` and expiry `t` in years.
    fn vol(&self, strike: f64, t: f64) -> f64;

    /// Total implied variance `σ²T`.
    fn total_variance(&self, strike: f64, t: f64) -> f64 {
        let vol = self.vol(strike, t);
        vol * vol * t.max(0.0)
    }

    /// Volatility for an expiry date.
    fn vol_at(&self, strike: f64, expiry: Date) -> f64 {
        self.vol(strike, year_fraction(self.reference_date(), expiry))
    }
}

impl<S: VolSurface + ?Sized> VolSurface for &S {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
    fn vol(&self, strike: f64, t: f64) -> f64 {
        (**self).vol(strike, t)
    }
}

impl<S: VolSurface + ?Sized> VolSurface for Arc<S> {
    fn reference_date(&self) -> Date {
        (**self).reference_date()
    }
    fn vol(&self, strike: f64, t: f64) -> f64 {
        (**self).vol(strike, t)
    }
}

/// Where an expiry falls on a strictly increasing tenor grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Bracket {
    /// Before the first or after the last tenor, or exactly on one.
    Single(usize),
    /// Between tenors `i` and `i + 1` with weight `w` on `i + 1`.
    Between(usize, f64),
}

pub(crate) fn bracket(times: &[f64], t: f64) -> Bracket {
    let n = times.len();
    if n <= 1 || t <= times[0] {
        return Bracket::Single(0);
    }
    if t >= times[n - 1] {
        return Bracket::Single(n - 1);
    }
    let i = times.partition_point(|&ti| ti <= t) - 1;
    Bracket::Between(i, (t - times[i]) / (times[i + 1] - times[i]))
}

/// Interpolates linearly in total variance `σ²T` between tenors, flat in
/// vol outside the grid.
pub(crate) fn interpolate_vol(times: &[f64], t: f64, vol_at_tenor: impl Fn(usize) -> f64) -> f64 {
    match bracket(times, t) {
        Bracket::Single(i) => vol_at_tenor(i),
        Bracket::Between(i, w) => {
            let v0 = vol_at_tenor(i);
            let v1 = vol_at_tenor(i + 1);
            let var0 = v0 * v0 * times[i];
            let var1 = v1 * v1 * times[i + 1];
            ((var0 + w * (var1 - var0)) / t).max(0.0).sqrt()
        }
    }
}
