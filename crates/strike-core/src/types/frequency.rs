//! Frequency and compounding types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment frequency for coupon and swap legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    /// Annual payments (1 per year)
    #[default]
    Annual,
    /// Semi-annual payments (2 per year)
    SemiAnnual,
    /// Every four months (3 per year)
    TriAnnual,
    /// Quarterly payments (4 per year)
    Quarterly,
    /// Monthly payments (12 per year)
    Monthly,
    /// Zero coupon (single payment at maturity)
    Zero,
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::TriAnnual => 3,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::Zero => 0,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Annual => 12,
            Frequency::SemiAnnual => 6,
            Frequency::TriAnnual => 4,
            Frequency::Quarterly => 3,
            Frequency::Monthly => 1,
            Frequency::Zero => 0,
        }
    }

    /// Returns true if this is a zero coupon (no periodic payments).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        matches!(self, Frequency::Zero)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::TriAnnual => "Tri-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
            Frequency::Zero => "Zero Coupon",
        };
        write!(f, "{name}")
    }
}

/// Interest compounding convention.
///
/// Maps a rate and an accrual fraction α to a discount factor:
///
/// | Convention | Discount factor |
/// |------------|-----------------|
/// | Simple     | 1 / (1 + r·α) |
/// | Periodic (f per year) | (1 + r/f)^(−f·α) |
/// | Continuous | exp(−r·α) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compounding {
    /// Simple interest (no compounding)
    Simple,
    /// Annual compounding (1x per year)
    Annual,
    /// Semi-annual compounding (2x per year)
    SemiAnnual,
    /// Quarterly compounding (4x per year)
    Quarterly,
    /// Monthly compounding (12x per year)
    Monthly,
    /// Continuous compounding
    #[default]
    Continuous,
}

impl Compounding {
    /// Returns the number of compounding periods per year, `None` for
    /// simple and continuous.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Compounding::Annual => Some(1),
            Compounding::SemiAnnual => Some(2),
            Compounding::Quarterly => Some(4),
            Compounding::Monthly => Some(12),
            Compounding::Simple | Compounding::Continuous => None,
        }
    }

    /// Discount factor for `rate` accrued over `t` years.
    #[must_use]
    pub fn discount_factor(&self, rate: f64, t: f64) -> f64 {
        match self {
            Compounding::Continuous => (-rate * t).exp(),
            Compounding::Simple => 1.0 / (1.0 + rate * t),
            periodic => {
                let f = f64::from(periodic.periods_per_year().unwrap_or(1));
                (1.0 + rate / f).powf(-f * t)
            }
        }
    }

    /// Zero rate that reproduces `df` over `t` years.
    ///
    /// Returns 0 when `t` is not positive.
    #[must_use]
    pub fn zero_rate(&self, df: f64, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        match self {
            Compounding::Continuous => -df.ln() / t,
            Compounding::Simple => (1.0 / df - 1.0) / t,
            periodic => {
                let f = f64::from(periodic.periods_per_year().unwrap_or(1));
                f * (df.powf(-1.0 / (f * t)) - 1.0)
            }
        }
    }

    /// Converts a rate quoted under `self` into the equivalent rate under
    /// `target` over horizon `t`.
    #[must_use]
    pub fn convert_to(&self, rate: f64, target: Compounding, t: f64) -> f64 {
        let df = self.discount_factor(rate, t);
        target.zero_rate(df, t)
    }
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compounding::Simple => "Simple",
            Compounding::Annual => "Annual",
            Compounding::SemiAnnual => "Semi-Annual",
            Compounding::Quarterly => "Quarterly",
            Compounding::Monthly => "Monthly",
            Compounding::Continuous => "Continuous",
        };
        write!(f, "{name}")
    }
}

impl From<Frequency> for Compounding {
    fn from(freq: Frequency) -> Self {
        match freq {
            Frequency::Annual => Compounding::Annual,
            Frequency::SemiAnnual => Compounding::SemiAnnual,
            Frequency::Quarterly => Compounding::Quarterly,
            Frequency::Monthly => Compounding::Monthly,
            Frequency::TriAnnual | Frequency::Zero => Compounding::Continuous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_periods() {
        assert_eq!(Frequency::Annual.periods_per_year(), 1);
        assert_eq!(Frequency::Quarterly.months_per_period(), 3);
        assert_eq!(Frequency::TriAnnual.months_per_period(), 4);
        assert!(Frequency::Zero.is_zero());
    }

    #[test]
    fn test_discount_factor_conventions() {
        assert_relative_eq!(
            Compounding::Continuous.discount_factor(0.05, 1.0),
            (-0.05_f64).exp(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            Compounding::SemiAnnual.discount_factor(0.05, 1.0),
            1.025_f64.powi(-2),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            Compounding::Simple.discount_factor(0.05, 0.5),
            1.0 / 1.025,
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_roundtrip_all_compounding() {
        for compounding in [
            Compounding::Continuous,
            Compounding::Annual,
            Compounding::SemiAnnual,
            Compounding::Quarterly,
            Compounding::Monthly,
            Compounding::Simple,
        ] {
            let df = compounding.discount_factor(0.05, 2.0);
            assert_relative_eq!(compounding.zero_rate(df, 2.0), 0.05, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_convert_continuous_to_annual() {
        let annual = Compounding::Continuous.convert_to(0.05, Compounding::Annual, 1.0);
        assert_relative_eq!(annual, 0.05_f64.exp() - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Frequency::SemiAnnual).unwrap();
        assert_eq!(json, "\"SEMI_ANNUAL\"");
        let c: Compounding = serde_json::from_str("\"CONTINUOUS\"").unwrap();
        assert_eq!(c, Compounding::Continuous);
    }
}
