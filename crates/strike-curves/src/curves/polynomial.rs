//! Polynomial zero curve.

use serde::{Deserialize, Serialize};
use strike_core::daycounts::DayCountType;
use strike_core::types::Compounding;
use strike_core::Date;

use crate::error::{CurveError, CurveResult};
use crate::traits::{check_time_day_count, Curve};

/// Zero rate given by a polynomial in time, `z(t) = Σ a_k t^k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialCurve {
    reference_date: Date,
    coefficients: Vec<f64>,
    compounding: Compounding,
    day_count: DayCountType,
}

impl PolynomialCurve {
    /// Creates a polynomial curve; `coefficients[k]` multiplies `t^k`.
    pub fn new(
        reference_date: Date,
        coefficients: Vec<f64>,
        compounding: Compounding,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        check_time_day_count(day_count)?;
        if coefficients.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }
        Ok(Self {
            reference_date,
            coefficients,
            compounding,
            day_count,
        })
    }

    /// Zero rate at time `t` (Horner evaluation).
    pub fn rate(&self, t: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, a| acc * t + a)
    }
}

impl Curve for PolynomialCurve {
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

    #[test]
    fn test_quadratic() {
        let anchor = Date::from_ymd(2020, 1, 1).unwrap();
        let curve = PolynomialCurve::new(
            anchor,
            vec![0.01, 0.002, -0.0001],
            Compounding::Continuous,
            DayCountType::Act365F,
        )
        .unwrap();
        assert_relative_eq!(curve.rate(2.0), 0.01 + 0.004 - 0.0004, epsilon = 1e-15);
        assert_relative_eq!(curve.discount_factor(2.0), (-0.0136_f64 * 2.0).exp(), epsilon = 1e-15);
    }
}
