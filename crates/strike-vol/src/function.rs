//! Parametric smile functions.
//!
//! A [`VolFunction`] maps `(F, K, T)` to a Black volatility. Each variant
//! owns a fixed-size parameter array whose length is part of the type, and
//! [`VolFunction::vol`] is the single dispatch point.

use serde::{Deserialize, Serialize};
use std::fmt;

use strike_math::distributions::norm_cdf;
use strike_options::sabr::sabr_vol;

use crate::error::{VolError, VolResult};

/// Floor applied to every smile volatility.
pub const MIN_VOL: f64 = 1e-8;

/// Selects a smile parametrisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolFunctionType {
    /// Clark quadratic in `N(x) − ½`.
    #[default]
    Clark,
    /// Clark quartic in `N(x) − ½`.
    Clark5,
    /// Hagan SABR with free β.
    Sabr,
    /// SABR with β = 1.
    SabrBetaOne,
    /// SABR with β = ½.
    SabrBetaHalf,
    /// Quadratic in forward delta.
    Bbg,
    /// Raw SVI total variance.
    Svi,
    /// Surface SVI slice with a Heston-like φ.
    Ssvi,
    /// First-order vanna-volga interpolation between three anchor vols.
    VannaVolga,
}

impl VolFunctionType {
    /// All parametrisations.
    pub const ALL: [VolFunctionType; 9] = [
        VolFunctionType::Clark,
        VolFunctionType::Clark5,
        VolFunctionType::Sabr,
        VolFunctionType::SabrBetaOne,
        VolFunctionType::SabrBetaHalf,
        VolFunctionType::Bbg,
        VolFunctionType::Svi,
        VolFunctionType::Ssvi,
        VolFunctionType::VannaVolga,
    ];

    /// Number of calibrated parameters.
    #[must_use]
    pub fn num_params(&self) -> usize {
        match self {
            VolFunctionType::Clark5 | VolFunctionType::Svi => 5,
            VolFunctionType::Sabr => 4,
            _ => 3,
        }
    }
}

impl fmt::Display for VolFunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VolFunctionType::Clark => "CLARK",
            VolFunctionType::Clark5 => "CLARK5",
            VolFunctionType::Sabr => "SABR",
            VolFunctionType::SabrBetaOne => "SABR_BETA_ONE",
            VolFunctionType::SabrBetaHalf => "SABR_BETA_HALF",
            VolFunctionType::Bbg => "BBG",
            VolFunctionType::Svi => "SVI",
            VolFunctionType::Ssvi => "SSVI",
            VolFunctionType::VannaVolga => "VANNA_VOLGA",
        };
        write!(f, "{name}")
    }
}

/// A smile parametrisation with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolFunction {
    /// `[ln σ0, c1, c2]`: `σ = exp(Σ cᵢ uⁱ)` with
    /// `u = N(ln(F/K)/(σ0√T)) − ½` and `c0 = ln σ0`.
    Clark([f64; 3]),
    /// `[ln σ0, c1, c2, c3, c4]`, as [`VolFunction::Clark`].
    Clark5([f64; 5]),
    /// `[α, β, ρ, ν]`.
    Sabr([f64; 4]),
    /// `[α, ρ, ν]` with β = 1.
    SabrBetaOne([f64; 3]),
    /// `[α, ρ, ν]` with β = ½.
    SabrBetaHalf([f64; 3]),
    /// `[a, b, c]`: `σ = aΔ² + bΔ + c` in forward delta `Δ = N(d1)`, with
    /// `d1` taken at the delta-½ vol `a/4 + b/2 + c`.
    Bbg([f64; 3]),
    /// `[a, b, ρ, m, s]`: `w = a + b(ρ(x − m) + √((x − m)² + s²))`,
    /// `x = ln(F/K)`.
    Svi([f64; 5]),
    /// `[γ, σ, ρ]`: total ATM variance `θ = σ²T` and
    /// `φ(θ) = (1 − (1 − e^{−γθ})/(γθ))/(γθ)`.
    Ssvi([f64; 3]),
    /// Anchor vols `[σ_P, σ_ATM, σ_C]` at strikes `[K_P, K_ATM, K_C]`.
    VannaVolga {
        /// Vols at the three anchors.
        vols: [f64; 3],
        /// Increasing anchor strikes.
        strikes: [f64; 3],
    },
}

fn array<const N: usize>(function: VolFunctionType, params: &[f64]) -> VolResult<[f64; N]> {
    params.try_into().map_err(|_| VolError::ParameterCount {
        function,
        expected: N,
        got: params.len(),
    })
}

impl VolFunction {
    /// Builds a function from a flat parameter slice.
    ///
    /// Vanna-volga takes six values: the three anchor vols followed by the
    /// three anchor strikes.
    pub fn from_params(function: VolFunctionType, params: &[f64]) -> VolResult<Self> {
        if params.iter().any(|p| !p.is_finite()) {
            return Err(VolError::invalid_input(format!(
                "{function} parameters must be finite, got {params:?}"
            )));
        }
        Ok(match function {
            VolFunctionType::Clark => VolFunction::Clark(array(function, params)?),
            VolFunctionType::Clark5 => VolFunction::Clark5(array(function, params)?),
            VolFunctionType::Sabr => VolFunction::Sabr(array(function, params)?),
            VolFunctionType::SabrBetaOne => VolFunction::SabrBetaOne(array(function, params)?),
            VolFunctionType::SabrBetaHalf => VolFunction::SabrBetaHalf(array(function, params)?),
            VolFunctionType::Bbg => VolFunction::Bbg(array(function, params)?),
            VolFunctionType::Svi => VolFunction::Svi(array(function, params)?),
            VolFunctionType::Ssvi => VolFunction::Ssvi(array(function, params)?),
            VolFunctionType::VannaVolga => {
                let all: [f64; 6] = array(function, params)?;
                VolFunction::VannaVolga {
                    vols: [all[0], all[1], all[2]],
                    strikes: [all[3], all[4], all[5]],
                }
            }
        })
    }

    /// The parametrisation.
    pub fn function_type(&self) -> VolFunctionType {
        match self {
            VolFunction::Clark(_) => VolFunctionType::Clark,
            VolFunction::Clark5(_) => VolFunctionType::Clark5,
            VolFunction::Sabr(_) => VolFunctionType::Sabr,
            VolFunction::SabrBetaOne(_) => VolFunctionType::SabrBetaOne,
            VolFunction::SabrBetaHalf(_) => VolFunctionType::SabrBetaHalf,
            VolFunction::Bbg(_) => VolFunctionType::Bbg,
            VolFunction::Svi(_) => VolFunctionType::Svi,
            VolFunction::Ssvi(_) => VolFunctionType::Ssvi,
            VolFunction::VannaVolga { .. } => VolFunctionType::VannaVolga,
        }
    }

    /// The calibrated parameters.
    pub fn params(&self) -> &[f64] {
        match self {
            VolFunction::Clark(p)
            | VolFunction::SabrBetaOne(p)
            | VolFunction::SabrBetaHalf(p)
            | VolFunction::Bbg(p)
            | VolFunction::Ssvi(p) => p,
            VolFunction::Clark5(p) | VolFunction::Svi(p) => p,
            VolFunction::Sabr(p) => p,
            VolFunction::VannaVolga { vols, .. } => vols,
        }
    }

    /// Black volatility at strike `k` for forward `f` and expiry `t`.
    ///
    /// Always finite and at least [`MIN_VOL`].
    pub fn vol(&self, f: f64, k: f64, t: f64) -> f64 {
        let t = t.max(1e-10);
        let vol = match self {
            VolFunction::Clark(c) => clark(c, f, k, t),
            VolFunction::Clark5(c) => clark(c, f, k, t),
            VolFunction::Sabr([alpha, beta, rho, nu]) => sabr_vol(*alpha, *beta, *rho, *nu, f, k, t),
            VolFunction::SabrBetaOne([alpha, rho, nu]) => sabr_vol(*alpha, 1.0, *rho, *nu, f, k, t),
            VolFunction::SabrBetaHalf([alpha, rho, nu]) => sabr_vol(*alpha, 0.5, *rho, *nu, f, k, t),
            VolFunction::Bbg(p) => bbg(p, f, k, t),
            VolFunction::Svi(p) => (svi_total_variance(p, (f / k).ln()) / t).sqrt(),
            VolFunction::Ssvi(p) => (ssvi_total_variance(p, (f / k).ln(), t) / t).sqrt(),
            VolFunction::VannaVolga { vols, strikes } => vanna_volga(vols, strikes, k),
        };
        if vol.is_finite() {
            vol.max(MIN_VOL)
        } else {
            MIN_VOL
        }
    }
}

fn clark(c: &[f64], f: f64, k: f64, t: f64) -> f64 {
    let sigma0 = c[0].exp();
    let u = norm_cdf((f / k).ln() / (sigma0 * t.sqrt())) - 0.5;
    let exponent = c.iter().rev().fold(0.0, |acc, ci| acc * u + ci);
    exponent.exp()
}

fn bbg(p: &[f64; 3], f: f64, k: f64, t: f64) -> f64 {
    let [a, b, c] = *p;
    let sigma_mid = (0.25 * a + 0.5 * b + c).max(MIN_VOL);
    let st = sigma_mid * t.sqrt();
    let delta = norm_cdf((f / k).ln() / st + 0.5 * st);
    (a * delta + b) * delta + c
}

fn svi_total_variance(p: &[f64; 5], x: f64) -> f64 {
    let [a, b, rho, m, s] = *p;
    let y = x - m;
    (a + b * (rho * y + (y * y + s * s).sqrt())).max(0.0)
}

fn ssvi_phi(theta: f64, gamma: f64) -> f64 {
    let gt = gamma * theta;
    if gt.abs() < 1e-8 {
        return 0.5 - gt / 6.0;
    }
    (1.0 - (1.0 - (-gt).exp()) / gt) / gt
}

fn ssvi_total_variance(p: &[f64; 3], x: f64, t: f64) -> f64 {
    let [gamma, sigma, rho] = *p;
    let rho = rho.clamp(-0.9999, 0.9999);
    let theta = sigma * sigma * t;
    let px = ssvi_phi(theta, gamma) * x;
    let g = px + rho;
    0.5 * theta * (1.0 + rho * px + (g * g + 1.0 - rho * rho).sqrt())
}

/// Castagna–Mercurio first-order weights: `σ(K) = Σ yᵢ σᵢ` with
/// `yᵢ = Π_{j≠i} ln(Kⱼ/K) / Π_{j≠i} ln(Kⱼ/Kᵢ)`.
fn vanna_volga(vols: &[f64; 3], strikes: &[f64; 3], k: f64) -> f64 {
    let [k1, k2, k3] = *strikes;
    if !(k1 > 0.0 && k1 < k2 && k2 < k3) || k <= 0.0 {
        return vols[1];
    }
    let (l1, l2, l3) = ((k1 / k).ln(), (k2 / k).ln(), (k3 / k).ln());
    let y1 = l2 * l3 / ((k2 / k1).ln() * (k3 / k1).ln());
    let y2 = l1 * l3 / ((k1 / k2).ln() * (k3 / k2).ln());
    let y3 = l1 * l2 / ((k1 / k3).ln() * (k2 / k3).ln());
    y1 * vols[0] + y2 * vols[1] + y3 * vols[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const F: f64 = 1.35;
    const T: f64 = 0.75;

    #[test]
    fn test_clark_flat_and_atm() {
        let flat = VolFunction::Clark([0.2f64.ln(), 0.0, 0.0]);
        assert_relative_eq!(flat.vol(F, 1.1, T), 0.2, epsilon = 1e-14);
        let smile = VolFunction::Clark([0.2f64.ln(), 0.05, 0.8]);
        // u = 0 at the forward
        assert_relative_eq!(smile.vol(F, F, T), 0.2, epsilon = 1e-14);
        assert!(smile.vol(F, 1.1, T) > 0.2 && smile.vol(F, 1.6, T) > 0.2);
    }

    #[test]
    fn test_clark5_reduces_to_clark() {
        let c3 = VolFunction::Clark([0.15f64.ln(), -0.1, 0.6]);
        let c5 = VolFunction::Clark5([0.15f64.ln(), -0.1, 0.6, 0.0, 0.0]);
        for k in [1.0, 1.2, 1.35, 1.5, 1.8] {
            assert_relative_eq!(c3.vol(F, k, T), c5.vol(F, k, T), epsilon = 1e-14);
        }
    }

    #[test]
    fn test_sabr_variants_agree() {
        let free = VolFunction::Sabr([0.12, 1.0, -0.2, 0.6]);
        let fixed = VolFunction::SabrBetaOne([0.12, -0.2, 0.6]);
        assert_relative_eq!(free.vol(F, 1.4, T), fixed.vol(F, 1.4, T), epsilon = 1e-14);
        let half = VolFunction::Sabr([0.12, 0.5, -0.2, 0.6]);
        let fixed_half = VolFunction::SabrBetaHalf([0.12, -0.2, 0.6]);
        assert_relative_eq!(half.vol(F, 1.2, T), fixed_half.vol(F, 1.2, T), epsilon = 1e-14);
    }

    #[test]
    fn test_bbg_at_mid_delta() {
        let p = [0.4, -0.3, 0.18];
        let bbg = VolFunction::Bbg(p);
        let mid = 0.25 * p[0] + 0.5 * p[1] + p[2];
        // Δ = ½ where ln(F/K) = −σ²T/2
        let k = F * (0.5 * mid * mid * T).exp();
        assert_relative_eq!(bbg.vol(F, k, T), mid, epsilon = 1e-12);
    }

    #[test]
    fn test_svi_total_variance() {
        let p = [0.01, 0.1, -0.3, 0.02, 0.15];
        let svi = VolFunction::Svi(p);
        let x: f64 = (F / 1.5f64).ln();
        let y = x - p[3];
        let w = p[0] + p[1] * (p[2] * y + (y * y + p[4] * p[4]).sqrt());
        assert_relative_eq!(svi.vol(F, 1.5, T), (w / T).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_ssvi_atm_variance() {
        let ssvi = VolFunction::Ssvi([0.7, 0.12, -0.4]);
        assert_relative_eq!(ssvi.vol(F, F, T), 0.12, epsilon = 1e-14);
        // x = ln(F/K): negative ρ lifts the wing above the forward
        assert!(ssvi.vol(F, 1.2, T) < ssvi.vol(F, 1.5, T));
    }

    #[test]
    fn test_ssvi_phi_small_argument() {
        assert_relative_eq!(ssvi_phi(1e-10, 1.0), 0.5, epsilon = 1e-9);
        assert_relative_eq!(ssvi_phi(1e-4, 1.0), 0.5 - 1e-4 / 6.0, epsilon = 1e-7);
    }

    #[test]
    fn test_vanna_volga_hits_anchors() {
        let vv = VolFunction::VannaVolga {
            vols: [0.13, 0.11, 0.12],
            strikes: [1.25, 1.35, 1.45],
        };
        assert_relative_eq!(vv.vol(F, 1.25, T), 0.13, epsilon = 1e-14);
        assert_relative_eq!(vv.vol(F, 1.35, T), 0.11, epsilon = 1e-14);
        assert_relative_eq!(vv.vol(F, 1.45, T), 0.12, epsilon = 1e-14);
        let degenerate = VolFunction::VannaVolga {
            vols: [0.13, 0.11, 0.12],
            strikes: [1.35, 1.35, 1.45],
        };
        assert_eq!(degenerate.vol(F, 1.4, T), 0.11);
    }

    #[test]
    fn test_from_params_checks_length() {
        for function in VolFunctionType::ALL {
            let n = if function == VolFunctionType::VannaVolga { 6 } else { function.num_params() };
            let params = vec![0.1; n];
            let built = VolFunction::from_params(function, &params).unwrap();
            assert_eq!(built.function_type(), function);
            assert!(matches!(
                VolFunction::from_params(function, &params[1..]),
                Err(VolError::ParameterCount { .. })
            ));
        }
    }

    #[test]
    fn test_serde_shape() {
        let f = VolFunction::Clark([-1.5, 0.05, 0.8]);
        let json = serde_json::to_string(&f).unwrap();
        assert_eq!(json, r#"{"type":"CLARK","params":[-1.5,0.05,0.8]}"#);
        let back: VolFunction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
