//! Foreign discount curve implied by FX forwards.

use strike_core::daycounts::DayCountType;
use strike_core::Date;
use strike_math::interpolation::{Interpolator, LinearInterpolator};

use crate::error::{CurveError, CurveResult};
use crate::traits::{time_between, Curve};

/// Foreign-currency discount curve implied by covered interest parity.
///
/// With FX spot `S` quoted as domestic per foreign and outright forwards
/// `F(t)`, the foreign discount factor is
///
/// ```text
/// df_for(t) = df_dom(t) * F(t) / S
/// ```
///
/// `ln(F/S)` is interpolated linearly in time between the quoted
/// forwards and extended proportionally to `t` beyond the last one.
#[derive(Debug, Clone)]
pub struct FxImpliedCurve<C> {
    domestic: C,
    spot: f64,
    log_ratio: LinearInterpolator,
}

impl<C: Curve> FxImpliedCurve<C> {
    /// Creates the curve from forwards quoted at times `times`.
    pub fn new(domestic: C, spot: f64, times: &[f64], forwards: &[f64]) -> CurveResult<Self> {
        if !(spot.is_finite() && spot > 0.0) {
            return Err(CurveError::invalid_input(format!(
                "FX spot must be positive, got {spot}"
            )));
        }
        if times.len() != forwards.len() {
            return Err(CurveError::invalid_input(format!(
                "times and forwards differ in length: {} vs {}",
                times.len(),
                forwards.len()
            )));
        }
        if times.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }
        if let Some(f) = forwards.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(CurveError::invalid_input(format!(
                "FX forward must be positive, got {f}"
            )));
        }

        let mut xs = vec![0.0];
        let mut ys = vec![0.0];
        for (i, (t, f)) in times.iter().zip(forwards).enumerate() {
            let prev = xs[xs.len() - 1];
            if *t <= prev {
                return Err(CurveError::NonMonotonicTimes {
                    index: i,
                    prev,
                    current: *t,
                });
            }
            xs.push(*t);
            ys.push((f / spot).ln());
        }
        let log_ratio = LinearInterpolator::new(xs, ys)?;
        Ok(Self {
            domestic,
            spot,
            log_ratio,
        })
    }

    /// Creates the curve from forwards quoted at dates, with times measured
    /// under the domestic curve's day count.
    pub fn from_dates(domestic: C, spot: f64, dates: &[Date], forwards: &[f64]) -> CurveResult<Self> {
        let reference = domestic.reference_date();
        let dc = domestic.day_count();
        let times: Vec<f64> = dates.iter().map(|d| time_between(dc, reference, *d)).collect();
        Self::new(domestic, spot, &times, forwards)
    }

    /// FX spot.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// The domestic discount curve.
    pub fn domestic(&self) -> &C {
        &self.domestic
    }

    /// Interpolated outright forward at time `t`.
    pub fn forward(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return self.spot;
        }
        let t_max = self.log_ratio.max_x();
        let log_ratio = if t > t_max {
            self.log_ratio.interpolate(t_max) * t / t_max
        } else {
            self.log_ratio.interpolate(t)
        };
        self.spot * log_ratio.exp()
    }
}

impl<C: Curve> Curve for FxImpliedCurve<C> {
    fn reference_date(&self) -> Date {
        self.domestic.reference_date()
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.domestic.discount_factor(t) * self.forward(t) / self.spot
    }

    fn day_count(&self) -> DayCountType {
        self.domestic.day_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::FlatCurve;
    use approx::assert_relative_eq;
    use strike_core::types::Compounding;

    #[test]
    fn test_covered_interest_parity() {
        let anchor = Date::from_ymd(2025, 1, 2).unwrap();
        let domestic = FlatCurve::continuous(anchor, 0.04);
        let (spot, rf): (f64, f64) = (1.10, 0.02);
        let times = [0.25, 0.5, 1.0, 2.0];
        let forwards: Vec<f64> = times
            .iter()
            .map(|t| spot * ((0.04 - rf) * t).exp())
            .collect();
        let curve = FxImpliedCurve::new(&domestic, spot, &times, &forwards).unwrap();
        for t in [0.1, 0.75, 1.5, 3.0] {
            assert_relative_eq!(curve.zero_rate(t, Compounding::Continuous), rf, epsilon = 1e-12);
        }
        assert_eq!(curve.forward(0.0), spot);
    }

    #[test]
    fn test_rejects_bad_input() {
        let anchor = Date::from_ymd(2025, 1, 2).unwrap();
        let domestic = FlatCurve::continuous(anchor, 0.04);
        assert!(FxImpliedCurve::new(&domestic, -1.0, &[1.0], &[1.0]).is_err());
        assert!(FxImpliedCurve::new(&domestic, 1.0, &[1.0, 0.5], &[1.0, 1.0]).is_err());
    }
}
