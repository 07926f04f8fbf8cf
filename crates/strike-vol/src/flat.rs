//! Constant volatility surface.

use serde::{Deserialize, Serialize};

use strike_core::Date;

use crate::error::{VolError, VolResult};
use crate::traits::VolSurface;

/// The same Black volatility at every strike and expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatVolSurface {
    reference_date: Date,
    vol: f64,
}

impl FlatVolSurface {
    /// Creates a flat surface; the vol must be positive.
    pub fn new(reference_date: Date, vol: f64) -> VolResult<Self> {
        if !(vol.is_finite() && vol > 0.0) {
            return Err(VolError::invalid_input(format!("flat vol must be positive, got {vol}")));
        }
        Ok(Self { reference_date, vol })
    }

    /// Returns a surface with the vol shifted by `bump`.
    pub fn bumped(&self, bump: f64) -> VolResult<Self> {
        Self::new(self.reference_date, self.vol + bump)
    }
}

impl VolSurface for FlatVolSurface {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn vol(&self, _strike: f64, _t: f64) -> f64 {
        self.vol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_surface() {
        let d = Date::from_ymd(2024, 1, 2).unwrap();
        let s = FlatVolSurface::new(d, 0.25).unwrap();
        assert_eq!(s.vol(50.0, 0.1), 0.25);
        assert_eq!(s.vol_at(150.0, Date::from_ymd(2026, 1, 2).unwrap()), 0.25);
        assert!((s.total_variance(100.0, 2.0) - 0.125).abs() < 1e-15);
        assert!(FlatVolSurface::new(d, 0.0).is_err());
        assert!(s.bumped(-0.3).is_err());
        assert_eq!(s.bumped(0.01).unwrap().vol(1.0, 1.0), 0.26);
    }
}
