//! Parallel-shifted curve wrapper.

use strike_core::daycounts::DayCountType;
use strike_core::Date;

use crate::traits::Curve;

/// A curve whose discount factors are multiplied by `exp(-shift * t)`,
/// i.e. a parallel shift of the continuously compounded zero rate.
///
/// ```rust
/// use strike_core::Date;
/// use strike_curves::curves::{FlatCurve, ShiftedCurve};
/// use strike_curves::Curve;
///
/// let base = FlatCurve::continuous(Date::from_ymd(2025, 1, 1).unwrap(), 0.03);
/// let shifted = ShiftedCurve::new(&base, 0.0050);
/// assert!(shifted.discount_factor(1.0) < base.discount_factor(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct ShiftedCurve<C> {
    base: C,
    shift: f64,
}

impl<C: Curve> ShiftedCurve<C> {
    /// Wraps `base` with a continuous rate shift.
    pub fn new(base: C, shift: f64) -> Self {
        Self { base, shift }
    }

    /// The shift in rate units.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// The underlying curve.
    pub fn base(&self) -> &C {
        &self.base
    }
}

impl<C: Curve> Curve for ShiftedCurve<C> {
    fn reference_date(&self) -> Date {
        self.base.reference_date()
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.base.discount_factor(t) * (-self.shift * t).exp()
    }

    fn day_count(&self) -> DayCountType {
        self.base.day_count()
    }
}
