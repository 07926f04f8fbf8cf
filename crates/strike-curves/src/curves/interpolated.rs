//! Discount curves interpolated between knots.

use strike_core::daycounts::DayCountType;
use strike_core::Date;
use tracing::debug;

use crate::error::{CurveError, CurveResult};
use crate::interpolation::{CurveInterpolator, InterpolationType};
use crate::traits::{check_time_day_count, time_between, Curve};

/// A discount curve defined by `(t, df)` knots and an
/// [`InterpolationType`].
///
/// This is the curve produced by the bootstrappers. The knot at `t = 0`
/// with `df = 1` is always present.
///
/// ```rust
/// use strike_core::Date;
/// use strike_curves::curves::DiscountCurve;
/// use strike_curves::interpolation::InterpolationType;
/// use strike_curves::Curve;
///
/// let curve = DiscountCurve::builder(Date::from_ymd(2025, 1, 1).unwrap())
///     .with_interpolation(InterpolationType::LinearZeroRates)
///     .add_knot(1.0, 0.97)
///     .add_knot(5.0, 0.85)
///     .build()
///     .unwrap();
/// assert!((curve.discount_factor(1.0) - 0.97).abs() < 1e-14);
/// ```
#[derive(Debug, Clone)]
pub struct DiscountCurve {
    reference_date: Date,
    day_count: DayCountType,
    interpolator: CurveInterpolator,
}

impl DiscountCurve {
    /// Creates a curve from knot times and discount factors.
    pub fn new(
        reference_date: Date,
        times: &[f64],
        discount_factors: &[f64],
        interpolation: InterpolationType,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        check_time_day_count(day_count)?;
        let interpolator = CurveInterpolator::new(interpolation, times, discount_factors)?;
        Ok(Self {
            reference_date,
            day_count,
            interpolator,
        })
    }

    /// Creates a curve from knot dates and discount factors. Times are
    /// measured from `reference_date` under `day_count`.
    pub fn from_dates(
        reference_date: Date,
        dates: &[Date],
        discount_factors: &[f64],
        interpolation: InterpolationType,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        check_time_day_count(day_count)?;
        if let Some(d) = dates.iter().find(|d| **d < reference_date) {
            return Err(CurveError::invalid_input(format!(
                "knot date {d} precedes the reference date {reference_date}"
            )));
        }
        let times: Vec<f64> = dates
            .iter()
            .map(|d| time_between(day_count, reference_date, *d))
            .collect();
        Self::new(reference_date, &times, discount_factors, interpolation, day_count)
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder(reference_date: Date) -> DiscountCurveBuilder {
        DiscountCurveBuilder::new(reference_date)
    }

    /// Knots `(t, df)` including the origin.
    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.interpolator
            .times()
            .iter()
            .copied()
            .zip(self.interpolator.discount_factors().iter().copied())
    }

    /// Number of knots including the origin.
    pub fn len(&self) -> usize {
        self.interpolator.times().len()
    }

    /// True when only the origin knot is present.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Interpolation type.
    pub fn interpolation(&self) -> InterpolationType {
        self.interpolator.kind()
    }

    /// Last knot time.
    pub fn max_time(&self) -> f64 {
        self.interpolator.max_time()
    }

    /// Returns a curve whose knots are multiplied by `exp(-shift * t)`,
    /// keeping the interpolation type.
    pub fn bumped(&self, shift: f64) -> CurveResult<Self> {
        let (ts, dfs): (Vec<f64>, Vec<f64>) = self
            .knots()
            .skip(1)
            .map(|(t, df)| (t, df * (-shift * t).exp()))
            .unzip();
        debug!(shift, knots = ts.len(), "bumping discount curve knots");
        Self::new(
            self.reference_date,
            &ts,
            &dfs,
            self.interpolator.kind(),
            self.day_count,
        )
    }

    /// Re-fits the same knots with another interpolation type.
    pub fn with_interpolation(&self, interpolation: InterpolationType) -> CurveResult<Self> {
        let interpolator = CurveInterpolator::new(
            interpolation,
            self.interpolator.times(),
            self.interpolator.discount_factors(),
        )?;
        Ok(Self {
            interpolator,
            ..self.clone()
        })
    }
}

impl Curve for DiscountCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        self.interpolator.df(t)
    }

    fn day_count(&self) -> DayCountType {
        self.day_count
    }
}

/// Builder for [`DiscountCurve`].
#[derive(Debug, Clone)]
pub struct DiscountCurveBuilder {
    reference_date: Date,
    day_count: DayCountType,
    interpolation: InterpolationType,
    times: Vec<f64>,
    dfs: Vec<f64>,
    dated: Vec<(Date, f64)>,
}

impl DiscountCurveBuilder {
    /// Creates a builder on ACT/365F with flat forward interpolation.
    #[must_use]
    pub fn new(reference_date: Date) -> Self {
        Self {
            reference_date,
            day_count: DayCountType::Act365F,
            interpolation: InterpolationType::default(),
            times: Vec::new(),
            dfs: Vec::new(),
            dated: Vec::new(),
        }
    }

    /// Sets the day count measuring curve time.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountType) -> Self {
        self.day_count = day_count;
        self
    }

    /// Sets the interpolation type.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationType) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Adds a knot at time `t`.
    #[must_use]
    pub fn add_knot(mut self, t: f64, df: f64) -> Self {
        self.times.push(t);
        self.dfs.push(df);
        self
    }

    /// Adds a knot at `date`.
    #[must_use]
    pub fn add_dated_knot(mut self, date: Date, df: f64) -> Self {
        self.dated.push((date, df));
        self
    }

    /// Builds the curve. Knots are sorted by time first.
    pub fn build(self) -> CurveResult<DiscountCurve> {
        check_time_day_count(self.day_count)?;
        let mut knots: Vec<(f64, f64)> = self.times.into_iter().zip(self.dfs).collect();
        for (date, df) in self.dated {
            if date < self.reference_date {
                return Err(CurveError::invalid_input(format!(
                    "knot date {date} precedes the reference date {}",
                    self.reference_date
                )));
            }
            knots.push((time_between(self.day_count, self.reference_date, date), df));
        }
        knots.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (ts, dfs): (Vec<f64>, Vec<f64>) = knots.into_iter().unzip();
        DiscountCurve::new(self.reference_date, &ts, &dfs, self.interpolation, self.day_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strike_core::types::Compounding;

    fn anchor() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn sample(interpolation: InterpolationType) -> DiscountCurve {
        DiscountCurve::new(
            anchor(),
            &[0.5, 1.0, 2.0, 5.0, 10.0],
            &[0.985, 0.97, 0.94, 0.86, 0.74],
            interpolation,
            DayCountType::Act365F,
        )
        .unwrap()
    }

    #[test]
    fn test_knots_are_exact() {
        for kind in InterpolationType::all() {
            let curve = sample(*kind);
            for (t, df) in curve.knots() {
                assert_relative_eq!(curve.discount_factor(t), df, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_flat_zero_extrapolation() {
        let curve = sample(InterpolationType::FlatFwdRates);
        let z10 = curve.zero_rate(10.0, Compounding::Continuous);
        let z30 = curve.zero_rate(30.0, Compounding::Continuous);
        assert_relative_eq!(z10, z30, epsilon = 1e-14);
    }

    #[test]
    fn test_builder_sorts_and_accepts_dates() {
        let curve = DiscountCurve::builder(anchor())
            .add_knot(2.0, 0.94)
            .add_knot(1.0, 0.97)
            .add_dated_knot(Date::from_ymd(2030, 1, 2).unwrap(), 0.86)
            .build()
            .unwrap();
        assert_eq!(curve.len(), 4);
        assert_relative_eq!(
            curve.df(Date::from_ymd(2030, 1, 2).unwrap()),
            0.86,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_bumped_shifts_zero_rates() {
        let curve = sample(InterpolationType::LinearZeroRates);
        let bumped = curve.bumped(0.01).unwrap();
        for t in [0.5, 3.0, 7.0] {
            let diff = bumped.zero_rate(t, Compounding::Continuous)
                - curve.zero_rate(t, Compounding::Continuous);
            assert_relative_eq!(diff, 0.01, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_rejects_knots_before_anchor() {
        let err = DiscountCurve::from_dates(
            anchor(),
            &[Date::from_ymd(2024, 12, 31).unwrap()],
            &[1.0],
            InterpolationType::FlatFwdRates,
            DayCountType::Act365F,
        )
        .unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::InputValidation);
    }
}
