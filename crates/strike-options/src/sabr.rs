//! Hagan's SABR lognormal implied volatility, with an optional shift for
//! negative forwards.

use serde::{Deserialize, Serialize};

use crate::error::{OptionsError, OptionsResult};

/// SABR parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SabrParams {
    /// Initial volatility level α.
    pub alpha: f64,
    /// CEV exponent β in `[0, 1]`.
    pub beta: f64,
    /// Spot-vol correlation ρ in `(−1, 1)`.
    pub rho: f64,
    /// Vol of vol ν.
    pub nu: f64,
    /// Shift added to forward and strike.
    #[serde(default)]
    pub shift: f64,
}

impl SabrParams {
    /// Creates unshifted SABR parameters.
    pub fn new(alpha: f64, beta: f64, rho: f64, nu: f64) -> OptionsResult<Self> {
        let params = Self {
            alpha,
            beta,
            rho,
            nu,
            shift: 0.0,
        };
        params.validate()?;
        Ok(params)
    }

    /// Sets the shift.
    #[must_use]
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    /// Checks the parameter domain.
    pub fn validate(&self) -> OptionsResult<()> {
        if !(self.alpha > 0.0 && self.alpha.is_finite()) {
            return Err(OptionsError::invalid_input(format!(
                "SABR alpha must be positive, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(OptionsError::invalid_input(format!(
                "SABR beta must lie in [0, 1], got {}",
                self.beta
            )));
        }
        if !(self.rho > -1.0 && self.rho < 1.0) {
            return Err(OptionsError::invalid_input(format!(
                "SABR rho must lie in (-1, 1), got {}",
                self.rho
            )));
        }
        if !(self.nu >= 0.0 && self.nu.is_finite()) {
            return Err(OptionsError::invalid_input(format!(
                "SABR nu must be non-negative, got {}",
                self.nu
            )));
        }
        Ok(())
    }

    /// Black volatility at strike `k` for forward `f` and expiry `t`.
    ///
    /// Returns 0 when the shifted forward or strike is not positive.
    pub fn implied_vol(&self, f: f64, k: f64, t: f64) -> f64 {
        sabr_vol(
            self.alpha,
            self.beta,
            self.rho,
            self.nu,
            f + self.shift,
            k + self.shift,
            t,
        )
    }
}

/// Hagan et al. (2002) lognormal volatility approximation.
///
/// Parameters are clamped into their domain rather than rejected, so the
/// function can sit inside an unconstrained optimiser.
///
/// # Example
///
/// ```rust
/// use strike_options::sabr::sabr_vol;
///
/// // With ν = 0 and β = 1 SABR is Black with vol α.
/// let vol = sabr_vol(0.2, 1.0, 0.0, 0.0, 100.0, 120.0, 1.0);
/// assert!((vol - 0.2).abs() < 1e-12);
/// ```
pub fn sabr_vol(alpha: f64, beta: f64, rho: f64, nu: f64, f: f64, k: f64, t: f64) -> f64 {
    if f <= 0.0 || k <= 0.0 {
        return 0.0;
    }
    let t = t.max(0.0);
    let alpha = alpha.max(1e-12);
    let beta = beta.clamp(0.0, 1.0);
    let rho = rho.clamp(-0.9999, 0.9999);
    let nu = nu.max(0.0);
    let omb = 1.0 - beta;

    let time_factor = |fk_pow: f64| {
        1.0 + (omb * omb / 24.0 * alpha * alpha / fk_pow
            + rho * beta * nu * alpha / (4.0 * fk_pow.sqrt())
            + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
            * t
    };

    if (f - k).abs() <= 1e-12 * f {
        let f_pow = f.powf(omb);
        return alpha / f_pow * time_factor(f_pow * f_pow);
    }

    let fk_pow_half = (f * k).powf(0.5 * omb);
    let log_fk = (f / k).ln();
    let log2 = log_fk * log_fk;
    let denominator =
        fk_pow_half * (1.0 + omb * omb / 24.0 * log2 + omb.powi(4) / 1920.0 * log2 * log2);
    let z = nu / alpha * fk_pow_half * log_fk;

    let vol = alpha / denominator * z_over_x(z, rho) * time_factor(fk_pow_half * fk_pow_half);
    if vol.is_finite() {
        vol.max(0.0)
    } else {
        0.0
    }
}

/// `z / x(z)` with `x(z) = ln((√(1 − 2ρz + z²) + z − ρ)/(1 − ρ))`.
fn z_over_x(z: f64, rho: f64) -> f64 {
    if z.abs() < 1e-8 {
        return 1.0 - 0.5 * rho * z + (2.0 - 3.0 * rho * rho) / 12.0 * z * z;
    }
    let x = (((1.0 - 2.0 * rho * z + z * z).sqrt() + z - rho) / (1.0 - rho)).ln();
    if x.abs() > 1e-14 {
        z / x
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atm_formula() {
        let (alpha, beta, rho, nu) = (0.04, 0.5, -0.3, 0.5);
        let (f, t) = (0.03, 2.0);
        let f_pow = f64::powf(f, 0.5);
        let expected = alpha / f_pow
            * (1.0
                + (0.25 / 24.0 * alpha * alpha / f
                    + rho * beta * nu * alpha / (4.0 * f_pow)
                    + (2.0 - 3.0 * rho * rho) / 24.0 * nu * nu)
                    * t);
        assert_relative_eq!(sabr_vol(alpha, beta, rho, nu, f, f, t), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_continuous_through_atm() {
        let params = SabrParams::new(0.2, 1.0, -0.4, 0.6).unwrap();
        let atm = params.implied_vol(1.0, 1.0, 1.0);
        let near = params.implied_vol(1.0, 1.0 + 1e-7, 1.0);
        assert_relative_eq!(atm, near, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_rho_skews_down() {
        let params = SabrParams::new(0.2, 1.0, -0.5, 0.8).unwrap();
        assert!(params.implied_vol(1.0, 0.8, 1.0) > params.implied_vol(1.0, 1.2, 1.0));
    }

    #[test]
    fn test_shift_allows_negative_forward() {
        let params = SabrParams::new(0.05, 0.5, 0.0, 0.3).unwrap().with_shift(0.02);
        let vol = params.implied_vol(-0.005, -0.002, 1.0);
        assert!(vol > 0.0);
        assert_eq!(SabrParams::new(0.05, 0.5, 0.0, 0.3).unwrap().implied_vol(-0.005, 0.01, 1.0), 0.0);
    }

    #[test]
    fn test_validation() {
        assert!(SabrParams::new(0.0, 0.5, 0.0, 0.3).is_err());
        assert!(SabrParams::new(0.1, 1.5, 0.0, 0.3).is_err());
        assert!(SabrParams::new(0.1, 0.5, 1.0, 0.3).is_err());
        assert!(SabrParams::new(0.1, 0.5, 0.0, -0.3).is_err());
    }
}
