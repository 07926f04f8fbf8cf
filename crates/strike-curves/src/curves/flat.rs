//! Flat rate curve.

use serde::{Deserialize, Serialize};
use strike_core::daycounts::DayCountType;
use strike_core::types::Compounding;
use strike_core::Date;

use crate::error::CurveResult;
use crate::traits::{check_time_day_count, Curve};

/// A single rate applied at every maturity.
///
/// `df(t)` follows the compounding formula, e.g. `exp(-r t)` for
/// continuous and `(1 + r/f)^(-f t)` for `f` periods per year, with `t`
/// measured under the curve's day count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatCurve {
    reference_date: Date,
    rate: f64,
    compounding: Compounding,
    day_count: DayCountType,
}

impl FlatCurve {
    /// Creates a flat curve.
    pub fn new(
        reference_date: Date,
        rate: f64,
        compounding: Compounding,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        check_time_day_count(day_count)?;
        Ok(Self {
            reference_date,
            rate,
            compounding,
            day_count,
        })
    }

    /// Continuously compounded flat curve on ACT/365F.
    pub fn continuous(reference_date: Date, rate: f64) -> Self {
        Self {
            reference_date,
            rate,
            compounding: Compounding::Continuous,
            day_count: DayCountType::Act365F,
        }
    }

    /// The quoted rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The compounding convention of the quoted rate.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }
}

impl Curve for FlatCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn discount_factor(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        self.compounding.discount_factor(self.rate, t)
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
    fn test_continuous_act_act() {
        let anchor = Date::from_ymd(2019, 1, 1).unwrap();
        let curve =
            FlatCurve::new(anchor, 0.05, Compounding::Continuous, DayCountType::ActActIsda).unwrap();
        assert_relative_eq!(
            curve.df(Date::from_ymd(2020, 1, 1).unwrap()),
            0.951_229_424_500_714,
            epsilon = 1e-12
        );
        assert_eq!(curve.df(anchor), 1.0);
    }

    #[test]
    fn test_periodic_compounding() {
        let anchor = Date::from_ymd(2019, 1, 1).unwrap();
        let curve =
            FlatCurve::new(anchor, 0.04, Compounding::SemiAnnual, DayCountType::Act365F).unwrap();
        assert_relative_eq!(curve.discount_factor(2.0), 1.02_f64.powi(-4), epsilon = 1e-15);
        assert_relative_eq!(curve.zero_rate(2.0, Compounding::SemiAnnual), 0.04, epsilon = 1e-14);
    }

    #[test]
    fn test_rejects_icma() {
        let anchor = Date::from_ymd(2019, 1, 1).unwrap();
        assert!(FlatCurve::new(anchor, 0.05, Compounding::Annual, DayCountType::ActActIcma).is_err());
    }
}
