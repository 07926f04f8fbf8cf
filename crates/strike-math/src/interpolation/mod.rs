//! One-dimensional interpolation over sorted knots.
//!
//! # Available Methods
//!
//! - [`LinearInterpolator`]: piecewise linear, C0
//! - [`CubicSpline`]: natural cubic spline, C2, may overshoot
//! - [`Pchip`]: Fritsch-Carlson monotone cubic, C1, preserves monotone data
//!
//! Every interpolator extrapolates flat: queries left of the first knot
//! return the first value, queries right of the last knot return the last
//! value, and the derivative there is zero. Curves build on this by
//! choosing which quantity (zero rate, log discount factor, forward) they
//! interpolate.

mod cubic_spline;
mod linear;
mod pchip;

pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use pchip::Pchip;

use crate::error::{MathError, MathResult};

/// Trait for interpolation methods.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> f64;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> f64;

    /// Returns the minimum x value in the data.
    fn min_x(&self) -> f64;

    /// Returns the maximum x value in the data.
    fn max_x(&self) -> f64;

    /// Checks if x is within the interpolation range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Checks lengths, finiteness and strict ordering of the knots.
pub(crate) fn validate_knots(xs: &[f64], ys: &[f64], min_points: usize) -> MathResult<()> {
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < min_points {
        return Err(MathError::insufficient_data(min_points, xs.len()));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("knots must be finite"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    Ok(())
}

/// Finds the index i such that xs[i] <= x < xs[i+1], clamped to the last
/// segment.
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let last = xs.len() - 2;
    match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal)) {
        Ok(i) => i.min(last),
        Err(i) => i.saturating_sub(1).min(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn monotone_data() -> (Vec<f64>, Vec<f64>) {
        (
            vec![0.0, 0.5, 1.0, 2.0, 5.0, 10.0],
            vec![1.0, 0.98, 0.955, 0.91, 0.78, 0.61],
        )
    }

    #[test]
    fn test_all_interpolators_hit_knots() {
        let (xs, ys) = monotone_data();
        let interpolators: Vec<Box<dyn Interpolator>> = vec![
            Box::new(LinearInterpolator::new(xs.clone(), ys.clone()).unwrap()),
            Box::new(CubicSpline::new(xs.clone(), ys.clone()).unwrap()),
            Box::new(Pchip::new(xs.clone(), ys.clone()).unwrap()),
        ];
        for interp in &interpolators {
            for (x, y) in xs.iter().zip(&ys) {
                assert_relative_eq!(interp.interpolate(*x), *y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_flat_extrapolation() {
        let (xs, ys) = monotone_data();
        let interpolators: Vec<Box<dyn Interpolator>> = vec![
            Box::new(LinearInterpolator::new(xs.clone(), ys.clone()).unwrap()),
            Box::new(CubicSpline::new(xs.clone(), ys.clone()).unwrap()),
            Box::new(Pchip::new(xs, ys).unwrap()),
        ];
        for interp in &interpolators {
            assert_relative_eq!(interp.interpolate(-1.0), 1.0);
            assert_relative_eq!(interp.interpolate(30.0), 0.61);
            assert_eq!(interp.derivative(30.0), 0.0);
        }
    }

    #[test]
    fn test_validation() {
        assert!(LinearInterpolator::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(LinearInterpolator::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(CubicSpline::new(vec![0.0, 1.0], vec![1.0, 2.0]).is_err());
        assert!(Pchip::new(vec![0.0, f64::NAN], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_find_segment() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(find_segment(&xs, -1.0), 0);
        assert_eq!(find_segment(&xs, 1.0), 1);
        assert_eq!(find_segment(&xs, 1.5), 1);
        assert_eq!(find_segment(&xs, 3.0), 2);
        assert_eq!(find_segment(&xs, 7.0), 2);
    }
}
