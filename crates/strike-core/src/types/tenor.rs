//! Tenor strings such as `3M`, `1Y`, `ON`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Unit of a [`Tenor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days.
    Days,
    /// Weeks of seven calendar days.
    Weeks,
    /// Calendar months (day clamped to month end).
    Months,
    /// Calendar years.
    Years,
}

impl TenorUnit {
    fn suffix(self) -> char {
        match self {
            TenorUnit::Days => 'D',
            TenorUnit::Weeks => 'W',
            TenorUnit::Months => 'M',
            TenorUnit::Years => 'Y',
        }
    }
}

/// A signed period expressed as a count of a [`TenorUnit`].
///
/// Parses `N[D|W|M|Y]` case-insensitively with an optional leading sign,
/// plus the money-market shorthands `ON` (one day) and `TN` (two days).
///
/// ```rust
/// use strike_core::types::{Tenor, TenorUnit};
///
/// let t: Tenor = "18m".parse().unwrap();
/// assert_eq!(t.count(), 18);
/// assert_eq!(t.unit(), TenorUnit::Months);
/// assert!((t.approx_years() - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    count: i32,
    unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor.
    #[must_use]
    pub const fn new(count: i32, unit: TenorUnit) -> Self {
        Self { count, unit }
    }

    /// Tenor of `n` days.
    #[must_use]
    pub const fn days(n: i32) -> Self {
        Self::new(n, TenorUnit::Days)
    }

    /// Tenor of `n` months.
    #[must_use]
    pub const fn months(n: i32) -> Self {
        Self::new(n, TenorUnit::Months)
    }

    /// Tenor of `n` years.
    #[must_use]
    pub const fn years(n: i32) -> Self {
        Self::new(n, TenorUnit::Years)
    }

    /// Signed unit count.
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Unit of the count.
    #[must_use]
    pub fn unit(&self) -> TenorUnit {
        self.unit
    }

    /// Length in years under the 365-day / 12-month approximation.
    #[must_use]
    pub fn approx_years(&self) -> f64 {
        let n = f64::from(self.count);
        match self.unit {
            TenorUnit::Days => n / 365.0,
            TenorUnit::Weeks => 7.0 * n / 365.0,
            TenorUnit::Months => n / 12.0,
            TenorUnit::Years => n,
        }
    }

    /// Returns the tenor with the sign flipped.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(-self.count, self.unit)
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        match normalized.as_str() {
            "ON" => return Ok(Tenor::days(1)),
            "TN" => return Ok(Tenor::days(2)),
            "" => return Err(CoreError::invalid_tenor(s, "empty tenor")),
            _ => {}
        }

        let Some((split, unit)) = normalized.char_indices().last() else {
            return Err(CoreError::invalid_tenor(s, "empty tenor"));
        };
        let number = &normalized[..split];
        let unit = match unit {
            'D' => TenorUnit::Days,
            'W' => TenorUnit::Weeks,
            'M' => TenorUnit::Months,
            'Y' => TenorUnit::Years,
            other => {
                return Err(CoreError::invalid_tenor(
                    s,
                    format!("unknown unit '{other}', expected D, W, M or Y"),
                ))
            }
        };

        let count = number
            .parse::<i32>()
            .map_err(|_| CoreError::invalid_tenor(s, "count is not an integer"))?;

        Ok(Tenor::new(count, unit))
    }
}

impl TryFrom<String> for Tenor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}
