//! Inflation index curve.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strike_core::Date;

use crate::error::{CurveError, CurveResult};

/// Monthly index levels with a publication lag.
///
/// The level for a date `d` is interpolated linearly in days between the
/// levels of the reference month `d - lag` and the month after it, using
/// the day of month of `d`:
///
/// ```text
/// I(d) = I(m) + (d.day - 1) / days_in_month(d) * (I(m + 1) - I(m))
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationIndexCurve {
    levels: BTreeMap<(i32, u32), f64>,
    lag_months: u32,
}

impl InflationIndexCurve {
    /// Creates the curve from `(date, level)` fixings. Only the year and
    /// month of each date are used.
    pub fn new(fixings: &[(Date, f64)], lag_months: u32) -> CurveResult<Self> {
        if fixings.len() < 2 {
            return Err(CurveError::InsufficientPoints {
                required: 2,
                got: fixings.len(),
            });
        }
        let mut levels = BTreeMap::new();
        for (date, level) in fixings {
            if !(level.is_finite() && *level > 0.0) {
                return Err(CurveError::invalid_input(format!(
                    "index level for {date} must be positive, got {level}"
                )));
            }
            if levels.insert((date.year(), date.month()), *level).is_some() {
                return Err(CurveError::invalid_input(format!(
                    "duplicate index fixing for {}-{:02}",
                    date.year(),
                    date.month()
                )));
            }
        }
        Ok(Self { levels, lag_months })
    }

    /// Fixing lag in months.
    pub fn lag_months(&self) -> u32 {
        self.lag_months
    }

    /// Published level for a reference month, if any.
    pub fn fixing(&self, year: i32, month: u32) -> Option<f64> {
        self.levels.get(&(year, month)).copied()
    }

    fn month_level(&self, date: Date) -> CurveResult<f64> {
        self.fixing(date.year(), date.month()).ok_or_else(|| {
            let first = self.levels.keys().next().copied().unwrap_or_default();
            let last = self.levels.keys().next_back().copied().unwrap_or_default();
            CurveError::out_of_range(
                "index reference month",
                format!("{}-{:02}", date.year(), date.month()),
                format!("{}-{:02}", first.0, first.1),
                format!("{}-{:02}", last.0, last.1),
            )
        })
    }

    /// Lagged, day-interpolated index level at `date`.
    pub fn index_level(&self, date: Date) -> CurveResult<f64> {
        let reference = date.start_of_month().add_months(-(self.lag_months as i32))?;
        let next = reference.add_months(1)?;
        let lo = self.month_level(reference)?;
        if date.day() == 1 {
            return Ok(lo);
        }
        let hi = self.month_level(next)?;
        let weight = f64::from(date.day() - 1) / f64::from(date.days_in_month());
        Ok(lo + weight * (hi - lo))
    }

    /// Ratio of the index level at `date` to that at `base`.
    pub fn index_ratio(&self, base: Date, date: Date) -> CurveResult<f64> {
        Ok(self.index_level(date)? / self.index_level(base)?)
    }
}
