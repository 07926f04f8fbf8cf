//! Day count conventions.
//!
//! A day count turns a pair of dates into a year fraction α together with
//! the numerator and denominator it was computed from. Some conventions
//! need more context: ACT/ACT ICMA and ACT/365L look at the end of the
//! reference period (`d3`) and the coupon frequency.
//!
//! # Supported Conventions
//!
//! | Type | Numerator | Denominator |
//! |------|-----------|-------------|
//! | ACT/365F | actual days | 365 |
//! | ACT/365L | actual days | 365 or 366 |
//! | ACT/360 | actual days | 360 |
//! | ACT/ACT ISDA | actual days, split by calendar year | 365 / 366 |
//! | ACT/ACT ICMA | actual days | f × days in reference period |
//! | 30/360 BOND | 30-day months | 360 |
//! | 30E/360 | 30-day months | 360 |
//! | 30E/360 ISDA | 30-day months, month-end aware | 360 |
//! | 30E+/360 | 30-day months, 31st rolls forward | 360 |
//! | SIMPLE | actual days | 365.242 |
//! | ZERO | 0 | 1 |
//!
//! ```rust
//! use strike_core::daycounts::{DayCount, DayCountType};
//! use strike_core::types::Date;
//!
//! let d1 = Date::from_ymd(2019, 1, 1).unwrap();
//! let d2 = Date::from_ymd(2019, 7, 1).unwrap();
//! let yf = DayCountType::Act360.year_frac(d1, d2, None, None).unwrap();
//! assert_eq!(yf.numerator, 181.0);
//! assert!((yf.alpha - 181.0 / 360.0).abs() < 1e-15);
//! ```
//!
//! When `d1 > d2` the result is the negated fraction of `(d2, d1)`.

mod actact;
mod actual;
mod thirty360;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// Year fraction with the day counts it was built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearFraction {
    /// The accrual factor α.
    pub alpha: f64,
    /// Days counted under the convention.
    pub numerator: f64,
    /// Days in the year basis used for the division.
    pub denominator: f64,
}

impl YearFraction {
    pub(crate) fn new(numerator: f64, denominator: f64) -> Self {
        let alpha = if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        };
        Self {
            alpha,
            numerator,
            denominator,
        }
    }

    fn negate(self) -> Self {
        Self {
            alpha: -self.alpha,
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

/// Trait for day count conventions.
pub trait DayCount: Send + Sync {
    /// Market name of the convention.
    fn name(&self) -> &'static str;

    /// Year fraction from `d1` to `d2`, with optional reference period end
    /// `d3` and coupon frequency.
    fn year_frac(
        &self,
        d1: Date,
        d2: Date,
        d3: Option<Date>,
        freq: Option<Frequency>,
    ) -> CoreResult<YearFraction>;

    /// Year fraction for conventions that need no extra context.
    fn year_fraction(&self, d1: Date, d2: Date) -> CoreResult<f64> {
        Ok(self.year_frac(d1, d2, None, None)?.alpha)
    }
}

/// Day count conventions selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayCountType {
    /// Actual/365 Fixed.
    #[default]
    #[serde(rename = "ACT_365F")]
    Act365F,
    /// Actual/365 Leap.
    #[serde(rename = "ACT_365L")]
    Act365L,
    /// Actual/360.
    #[serde(rename = "ACT_360")]
    Act360,
    /// Actual/Actual ISDA.
    #[serde(rename = "ACT_ACT_ISDA")]
    ActActIsda,
    /// Actual/Actual ICMA.
    #[serde(rename = "ACT_ACT_ICMA")]
    ActActIcma,
    /// 30/360 Bond Basis.
    #[serde(rename = "THIRTY_360_BOND")]
    Thirty360Bond,
    /// 30E/360 Eurobond.
    #[serde(rename = "THIRTY_E_360")]
    ThirtyE360,
    /// 30E/360 ISDA.
    #[serde(rename = "THIRTY_E_360_ISDA")]
    ThirtyE360Isda,
    /// 30E+/360.
    #[serde(rename = "THIRTY_E_PLUS_360")]
    ThirtyEPlus360,
    /// Actual days over the mean Gregorian year.
    #[serde(rename = "SIMPLE")]
    Simple,
    /// No accrual.
    #[serde(rename = "ZERO")]
    Zero,
}

impl DayCountType {
    /// Returns all conventions.
    #[must_use]
    pub fn all() -> &'static [DayCountType] {
        &[
            DayCountType::Act365F,
            DayCountType::Act365L,
            DayCountType::Act360,
            DayCountType::ActActIsda,
            DayCountType::ActActIcma,
            DayCountType::Thirty360Bond,
            DayCountType::ThirtyE360,
            DayCountType::ThirtyE360Isda,
            DayCountType::ThirtyEPlus360,
            DayCountType::Simple,
            DayCountType::Zero,
        ]
    }

    fn compute(
        &self,
        d1: Date,
        d2: Date,
        d3: Option<Date>,
        freq: Option<Frequency>,
    ) -> CoreResult<YearFraction> {
        match self {
            DayCountType::Act365F => Ok(actual::act_fixed(d1, d2, 365.0)),
            DayCountType::Act360 => Ok(actual::act_fixed(d1, d2, 360.0)),
            DayCountType::Simple => Ok(actual::act_fixed(d1, d2, actual::MEAN_YEAR_DAYS)),
            DayCountType::Act365L => Ok(actual::act_365_leap(d1, d2, d3, freq)),
            DayCountType::ActActIsda => Ok(actact::isda(d1, d2)),
            DayCountType::ActActIcma => actact::icma(d1, d2, d3, freq),
            DayCountType::Thirty360Bond => Ok(thirty360::bond_basis(d1, d2)),
            DayCountType::ThirtyE360 => Ok(thirty360::eurobond(d1, d2)),
            DayCountType::ThirtyE360Isda => Ok(thirty360::e_isda(d1, d2, d3)),
            DayCountType::ThirtyEPlus360 => Ok(thirty360::e_plus(d1, d2)),
            DayCountType::Zero => Ok(YearFraction::new(0.0, 1.0)),
        }
    }
}

impl DayCount for DayCountType {
    fn name(&self) -> &'static str {
        match self {
            DayCountType::Act365F => "ACT/365F",
            DayCountType::Act365L => "ACT/365L",
            DayCountType::Act360 => "ACT/360",
            DayCountType::ActActIsda => "ACT/ACT ISDA",
            DayCountType::ActActIcma => "ACT/ACT ICMA",
            DayCountType::Thirty360Bond => "30/360 BOND",
            DayCountType::ThirtyE360 => "30E/360",
            DayCountType::ThirtyE360Isda => "30E/360 ISDA",
            DayCountType::ThirtyEPlus360 => "30E+/360",
            DayCountType::Simple => "SIMPLE",
            DayCountType::Zero => "ZERO",
        }
    }

    fn year_frac(
        &self,
        d1: Date,
        d2: Date,
        d3: Option<Date>,
        freq: Option<Frequency>,
    ) -> CoreResult<YearFraction> {
        if d1 == d2 {
            return Ok(YearFraction {
                alpha: 0.0,
                numerator: 0.0,
                denominator: self
                    .compute(d1, d1.add_days(1), d3, freq)
                    .map_or(0.0, |yf| yf.denominator),
            });
        }
        if d1 > d2 {
            return Ok(self.compute(d2, d1, d3, freq)?.negate());
        }
        self.compute(d1, d2, d3, freq)
    }
}

impl fmt::Display for DayCountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DayCountType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('_', " ");
        match normalized.as_str() {
            "ACT/365F" | "ACT/365" | "ACT/365 FIXED" | "ACT 365F" => Ok(DayCountType::Act365F),
            "ACT/365L" | "ACT/365 LEAP" | "ACT 365L" => Ok(DayCountType::Act365L),
            "ACT/360" | "ACTUAL/360" | "ACT 360" => Ok(DayCountType::Act360),
            "ACT/ACT" | "ACT/ACT ISDA" | "ACTUAL/ACTUAL" | "ACT ACT ISDA" => {
                Ok(DayCountType::ActActIsda)
            }
            "ACT/ACT ICMA" | "ACT ACT ICMA" | "ISMA" => Ok(DayCountType::ActActIcma),
            "30/360" | "30/360 BOND" | "BOND" | "THIRTY 360 BOND" => {
                Ok(DayCountType::Thirty360Bond)
            }
            "30E/360" | "EUROBOND" | "THIRTY E 360" => Ok(DayCountType::ThirtyE360),
            "30E/360 ISDA" | "THIRTY E 360 ISDA" => Ok(DayCountType::ThirtyE360Isda),
            "30E+/360" | "THIRTY E PLUS 360" => Ok(DayCountType::ThirtyEPlus360),
            "SIMPLE" => Ok(DayCountType::Simple),
            "ZERO" => Ok(DayCountType::Zero),
            _ => Err(CoreError::day_count(format!("unknown day count convention: '{s}'"))),
        }
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
    fn test_same_date_is_zero() {
        for dc in DayCountType::all() {
            let yf = dc.year_frac(d(2020, 3, 1), d(2020, 3, 1), None, None).unwrap();
            assert_eq!(yf.alpha, 0.0, "{dc}");
        }
    }

    #[test]
    fn test_signed_when_reversed() {
        let fwd = DayCountType::Act365F
            .year_frac(d(2020, 1, 1), d(2020, 7, 1), None, None)
            .unwrap();
        let back = DayCountType::Act365F
            .year_frac(d(2020, 7, 1), d(2020, 1, 1), None, None)
            .unwrap();
        assert_relative_eq!(fwd.alpha, -back.alpha);
        assert_eq!(back.numerator, -182.0);
    }

    #[test]
    fn test_act_act_full_year() {
        let yf = DayCountType::ActActIsda
            .year_frac(d(2019, 1, 1), d(2020, 1, 1), None, None)
            .unwrap();
        assert_relative_eq!(yf.alpha, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_icma_requires_period() {
        let err = DayCountType::ActActIcma.year_frac(d(2020, 1, 1), d(2020, 3, 1), None, None);
        assert!(err.is_err());
    }

    #[test]
    fn test_parse_and_display_roundtrip() {
        for dc in DayCountType::all() {
            assert_eq!(dc.name().parse::<DayCountType>().unwrap(), *dc);
        }
        assert!("ACT/999".parse::<DayCountType>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DayCountType::ThirtyE360).unwrap();
        assert_eq!(json, "\"THIRTY_E_360\"");
    }
}
