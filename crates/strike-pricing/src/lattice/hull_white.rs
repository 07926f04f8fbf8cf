//! Closed-form Hull–White results.
//!
//! For `dr = (θ(t) − a·r)dt + σ·dW` fitted to `P(0, t)`:
//!
//! ```text
//! B(t, T) = (1 − e^{−a(T−t)}) / a
//! P(t, T) = A(t, T)·e^{−B(t, T)·r(t)}
//! ln A(t, T) = ln(P(0,T)/P(0,t)) + B·f(0,t) − σ²/(4a)·(1 − e^{−2at})·B²
//! ```
//!
//! Zero-bond options use the lognormal bond price with
//! `σ_P = σ/a·(1 − e^{−a(S−T)})·√((1 − e^{−2aT})/(2a))`, and coupon-bond
//! options are split into zero-bond options by Jamshidian's trick.

use strike_core::types::OptionType;
use strike_math::distributions::norm_cdf;
use strike_math::solvers::{newton_with_fallback, SolverConfig};

use crate::error::{require_positive, PricingError, PricingResult};

/// Below this mean reversion the `a → 0` limits are used.
const SMALL_REVERSION: f64 = 1e-8;

/// Hull–White model on a discount function.
pub struct HullWhiteAnalytic<'a> {
    a: f64,
    sigma: f64,
    discount: &'a dyn Fn(f64) -> f64,
}

impl<'a> HullWhiteAnalytic<'a> {
    /// Creates the model on `discount`, the discount factor from today.
    pub fn new(mean_reversion: f64, volatility: f64, discount: &'a dyn Fn(f64) -> f64) -> PricingResult<Self> {
        require_positive("Hull-White volatility", volatility)?;
        if !mean_reversion.is_finite() || mean_reversion < 0.0 {
            return Err(PricingError::invalid_input(format!(
                "mean reversion must be non-negative, got {mean_reversion}"
            )));
        }
        Ok(Self {
            a: mean_reversion,
            sigma: volatility,
            discount,
        })
    }

    /// `B(t, T)`.
    pub fn b(&self, t: f64, maturity: f64) -> f64 {
        let tau = maturity - t;
        if self.a < SMALL_REVERSION {
            tau
        } else {
            (1.0 - (-self.a * tau).exp()) / self.a
        }
    }

    /// Instantaneous forward rate `f(0, t)` by central difference.
    fn forward(&self, t: f64) -> f64 {
        let h = 1e-4;
        let lo = (t - h).max(0.0);
        let hi = t + h;
        ((self.discount)(lo) / (self.discount)(hi)).ln() / (hi - lo)
    }

    /// Price at `t` of a zero bond maturing at `maturity` given short rate `r`.
    pub fn zero_bond(&self, t: f64, maturity: f64, r: f64) -> f64 {
        let b = self.b(t, maturity);
        let variance_term = if self.a < SMALL_REVERSION {
            self.sigma * self.sigma * t / 2.0
        } else {
            self.sigma * self.sigma / (4.0 * self.a) * (1.0 - (-2.0 * self.a * t).exp())
        };
        let ln_a = ((self.discount)(maturity) / (self.discount)(t)).ln() + b * self.forward(t)
            - variance_term * b * b;
        ln_a.exp() * (-b * r).exp()
    }

    /// Vol of the bond price `P(T, S)` over `[0, T]`.
    fn bond_vol(&self, expiry: f64, maturity: f64) -> f64 {
        let spread = if self.a < SMALL_REVERSION {
            expiry
        } else {
            (1.0 - (-2.0 * self.a * expiry).exp()) / (2.0 * self.a)
        };
        self.sigma * self.b(expiry, maturity) * spread.sqrt()
    }

    /// Today's value of an option expiring at `expiry` on a zero bond
    /// maturing at `maturity`, struck at `strike` per unit face.
    pub fn zero_bond_option(&self, expiry: f64, maturity: f64, strike: f64, option_type: OptionType) -> f64 {
        let p_t = (self.discount)(expiry);
        let p_s = (self.discount)(maturity);
        let sigma_p = self.bond_vol(expiry, maturity);
        if sigma_p <= 0.0 {
            return option_type.payoff(p_s, strike * p_t);
        }
        let h = (p_s / (p_t * strike)).ln() / sigma_p + sigma_p / 2.0;
        let phi = option_type.phi();
        phi * (p_s * norm_cdf(phi * h) - strike * p_t * norm_cdf(phi * (h - sigma_p)))
    }

    /// Today's value of an option expiring at `expiry` on the cash flows
    /// `(time, amount)` paid after expiry, struck at `strike`.
    ///
    /// The critical rate `r*` solves `Σ c_i·P(T, T_i; r*) = K`; the option
    /// is then a portfolio of zero-bond options struck at `P(T, T_i; r*)`.
    pub fn coupon_bond_option(
        &self,
        expiry: f64,
        flows: &[(f64, f64)],
        strike: f64,
        option_type: OptionType,
        config: &SolverConfig,
    ) -> PricingResult<f64> {
        require_positive("bond option strike", strike)?;
        let flows: Vec<(f64, f64)> = flows.iter().copied().filter(|(t, _)| *t > expiry).collect();
        if flows.is_empty() {
            return Err(PricingError::invalid_input("no cash flows after the option expiry"));
        }
        let bond = |r: f64| -> f64 {
            flows
                .iter()
                .map(|(t, c)| c * self.zero_bond(expiry, *t, r))
                .sum::<f64>()
                - strike
        };
        let slope = |r: f64| -> f64 {
            flows
                .iter()
                .map(|(t, c)| -c * self.b(expiry, *t) * self.zero_bond(expiry, *t, r))
                .sum()
        };
        let guess = self.forward(expiry);
        let r_star = newton_with_fallback(bond, slope, guess, Some((guess - 0.5, guess + 0.5)), config)
            .map_err(|source| PricingError::SolveFailed {
                what: "Jamshidian critical rate",
                source,
            })?
            .root;

        Ok(flows
            .iter()
            .map(|(t, c)| {
                let k = self.zero_bond(expiry, *t, r_star);
                c * self.zero_bond_option(expiry, *t, k, option_type)
            })
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(t: f64) -> f64 {
        (-0.04 * t).exp()
    }

    #[test]
    fn test_zero_bond_reprices_curve_at_forward() {
        let hw = HullWhiteAnalytic::new(0.1, 0.01, &flat).unwrap();
        // at t = 0 the short rate equals the instantaneous forward
        assert_relative_eq!(hw.zero_bond(0.0, 5.0, 0.04), flat(5.0), epsilon = 1e-6);
        let lower = hw.zero_bond(1.0, 5.0, 0.03);
        let higher = hw.zero_bond(1.0, 5.0, 0.05);
        assert!(lower > higher);
    }

    #[test]
    fn test_zero_bond_put_call_parity() {
        let hw = HullWhiteAnalytic::new(0.05, 0.012, &flat).unwrap();
        let k = 0.9;
        let call = hw.zero_bond_option(1.0, 4.0, k, OptionType::Call);
        let put = hw.zero_bond_option(1.0, 4.0, k, OptionType::Put);
        assert_relative_eq!(call - put, flat(4.0) - k * flat(1.0), epsilon = 1e-12);
        assert!(call > 0.0 && put > 0.0);
    }

    #[test]
    fn test_zero_mean_reversion_limit() {
        let tiny = HullWhiteAnalytic::new(1e-10, 0.01, &flat).unwrap();
        let small = HullWhiteAnalytic::new(1e-5, 0.01, &flat).unwrap();
        let a = tiny.zero_bond_option(2.0, 5.0, 0.88, OptionType::Put);
        let b = small.zero_bond_option(2.0, 5.0, 0.88, OptionType::Put);
        assert_relative_eq!(a, b, max_relative = 1e-4);
    }

    #[test]
    fn test_jamshidian_single_flow_is_zero_bond_option() {
        let hw = HullWhiteAnalytic::new(0.08, 0.01, &flat).unwrap();
        let config = SolverConfig::new(1e-12, 100);
        let single = hw
            .coupon_bond_option(1.0, &[(3.0, 1.0)], 0.92, OptionType::Call, &config)
            .unwrap();
        assert_relative_eq!(single, hw.zero_bond_option(1.0, 3.0, 0.92, OptionType::Call), epsilon = 1e-10);
    }

    #[test]
    fn test_coupon_bond_parity() {
        let hw = HullWhiteAnalytic::new(0.08, 0.01, &flat).unwrap();
        let config = SolverConfig::new(1e-12, 100);
        let flows = [(2.0, 0.05), (3.0, 0.05), (4.0, 1.05)];
        let k = 1.0;
        let call = hw.coupon_bond_option(1.0, &flows, k, OptionType::Call, &config).unwrap();
        let put = hw.coupon_bond_option(1.0, &flows, k, OptionType::Put, &config).unwrap();
        let forward_bond: f64 = flows.iter().map(|(t, c)| c * flat(*t)).sum();
        assert_relative_eq!(call - put, forward_bond - k * flat(1.0), epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_expired_flows() {
        let hw = HullWhiteAnalytic::new(0.08, 0.01, &flat).unwrap();
        let config = SolverConfig::new(1e-12, 100);
        assert!(hw
            .coupon_bond_option(5.0, &[(3.0, 1.0)], 0.9, OptionType::Call, &config)
            .is_err());
        assert!(HullWhiteAnalytic::new(0.1, 0.0, &flat).is_err());
    }
}
