//! Black–Scholes value and Greeks for European options.
//!
//! The kernel works in spot terms with continuous rates: `r` discounts the
//! premium and `q` is the dividend (or foreign) yield, so the forward is
//! `F = S·e^{(r−q)T}`. All functions are infallible: `T`, `σ` and `K` are
//! clamped above [`EPSILON`] before any logarithm or division, so an expired
//! or zero-vol input returns the discounted intrinsic value.
//!
//! Greek conventions:
//!
//! | Greek | Definition |
//! |-------|------------|
//! | delta | `∂V/∂S` |
//! | gamma | `∂²V/∂S²` |
//! | vega  | `∂V/∂σ` per unit of vol |
//! | theta | `∂V/∂t` per year of calendar time (`−∂V/∂T`) |
//! | rho   | `∂V/∂r` per unit of rate |
//! | psi   | `∂V/∂q` per unit of yield |
//!
//! Batched versions over slices of [`BsParams`] evaluate in parallel with
//! rayon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strike_core::types::OptionType;
use strike_math::distributions::{norm_cdf, norm_pdf};

/// Floor applied to time, volatility and strike.
pub const EPSILON: f64 = 1e-10;

/// `d1` and `d2` of the Black–Scholes formula on the forward `f`.
#[inline]
pub(crate) fn d1_d2(f: f64, k: f64, t: f64, sigma: f64) -> (f64, f64) {
    let st = sigma * t.sqrt();
    let d1 = ((f / k).ln() + 0.5 * st * st) / st;
    (d1, d1 - st)
}

#[inline]
fn clamp(t: f64, k: f64, sigma: f64) -> (f64, f64, f64) {
    (t.max(EPSILON), k.max(EPSILON), sigma.max(EPSILON))
}

/// Discounted premium of a European option.
///
/// # Example
///
/// ```rust
/// use strike_core::types::OptionType;
/// use strike_options::black_scholes::bs_value;
///
/// let call = bs_value(100.0, 1.0, 100.0, 0.05, 0.01, 0.30, OptionType::Call);
/// let put = bs_value(100.0, 1.0, 100.0, 0.05, 0.01, 0.30, OptionType::Put);
/// let parity = 100.0 * (-0.01f64).exp() - 100.0 * (-0.05f64).exp();
/// assert!((call - put - parity).abs() < 1e-10);
/// ```
pub fn bs_value(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    bs_value_delivery(s, t, k, r, q, sigma, option_type, t)
}

/// Discounted premium when the payoff is delivered at `t_del ≥ t`.
///
/// Volatility accrues to expiry `t`; the forward and the discount run to
/// the delivery time.
#[allow(clippy::too_many_arguments)]
pub fn bs_value_delivery(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
    t_del: f64,
) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let t_del = t_del.max(t);
    let phi = option_type.phi();
    let f = s * ((r - q) * t_del).exp();
    let df = (-r * t_del).exp();
    let (d1, d2) = d1_d2(f, k, t, sigma);
    phi * df * (f * norm_cdf(phi * d1) - k * norm_cdf(phi * d2))
}

/// Discounted intrinsic value `df · max(φ(F − K), 0)`.
pub fn bs_intrinsic(s: f64, t: f64, k: f64, r: f64, q: f64, option_type: OptionType) -> f64 {
    let t = t.max(0.0);
    let f = s * ((r - q) * t).exp();
    (-r * t).exp() * option_type.payoff(f, k)
}

/// Spot delta `∂V/∂S`.
pub fn bs_delta(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let phi = option_type.phi();
    let f = s * ((r - q) * t).exp();
    let (d1, _) = d1_d2(f, k, t, sigma);
    phi * (-q * t).exp() * norm_cdf(phi * d1)
}

/// Gamma `∂²V/∂S²`, identical for calls and puts.
pub fn bs_gamma(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, _option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let f = s * ((r - q) * t).exp();
    let (d1, _) = d1_d2(f, k, t, sigma);
    (-q * t).exp() * norm_pdf(d1) / (s * sigma * t.sqrt())
}

/// Vega `∂V/∂σ`, identical for calls and puts.
pub fn bs_vega(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, _option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let f = s * ((r - q) * t).exp();
    let (d1, _) = d1_d2(f, k, t, sigma);
    s * (-q * t).exp() * norm_pdf(d1) * t.sqrt()
}

/// Theta per year of calendar time.
pub fn bs_theta(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let phi = option_type.phi();
    let f = s * ((r - q) * t).exp();
    let (d1, d2) = d1_d2(f, k, t, sigma);
    let dq = (-q * t).exp();
    let dr = (-r * t).exp();
    -dq * s * norm_pdf(d1) * sigma / (2.0 * t.sqrt()) - phi * r * k * dr * norm_cdf(phi * d2)
        + phi * q * s * dq * norm_cdf(phi * d1)
}

/// Rho `∂V/∂r`.
pub fn bs_rho(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let phi = option_type.phi();
    let f = s * ((r - q) * t).exp();
    let (_, d2) = d1_d2(f, k, t, sigma);
    phi * k * t * (-r * t).exp() * norm_cdf(phi * d2)
}

/// Psi `∂V/∂q`.
pub fn bs_psi(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    let (t, k, sigma) = clamp(t, k, sigma);
    let phi = option_type.phi();
    let f = s * ((r - q) * t).exp();
    let (d1, _) = d1_d2(f, k, t, sigma);
    -phi * s * t * (-q * t).exp() * norm_cdf(phi * d1)
}

/// Value and first-order Greeks of one option.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Greeks {
    /// Discounted premium.
    pub value: f64,
    /// `∂V/∂S`.
    pub delta: f64,
    /// `∂²V/∂S²`.
    pub gamma: f64,
    /// `∂V/∂σ`.
    pub vega: f64,
    /// `∂V/∂t` per year.
    pub theta: f64,
    /// `∂V/∂r`.
    pub rho: f64,
    /// `∂V/∂q`.
    pub psi: f64,
}

/// Inputs of a single Black–Scholes valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BsParams {
    /// Spot price.
    pub spot: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// Strike.
    pub strike: f64,
    /// Continuously compounded discount rate.
    pub rate: f64,
    /// Continuous dividend or foreign yield.
    pub dividend: f64,
    /// Black volatility.
    pub vol: f64,
    /// Call or put.
    pub option_type: OptionType,
}

impl BsParams {
    /// Creates a parameter set.
    #[must_use]
    pub fn new(
        spot: f64,
        time_to_expiry: f64,
        strike: f64,
        rate: f64,
        dividend: f64,
        vol: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            time_to_expiry,
            strike,
            rate,
            dividend,
            vol,
            option_type,
        }
    }

    /// Returns a copy with a different volatility.
    #[must_use]
    pub fn with_vol(mut self, vol: f64) -> Self {
        self.vol = vol;
        self
    }

    /// Discounted premium.
    pub fn value(&self) -> f64 {
        bs_value(
            self.spot,
            self.time_to_expiry,
            self.strike,
            self.rate,
            self.dividend,
            self.vol,
            self.option_type,
        )
    }

    /// Discounted intrinsic value.
    pub fn intrinsic(&self) -> f64 {
        bs_intrinsic(
            self.spot,
            self.time_to_expiry,
            self.strike,
            self.rate,
            self.dividend,
            self.option_type,
        )
    }

    /// Value and Greeks sharing one evaluation of `d1`, `d2`.
    pub fn greeks(&self) -> Greeks {
        let s = self.spot;
        let (t, k, sigma) = clamp(self.time_to_expiry, self.strike, self.vol);
        let (r, q) = (self.rate, self.dividend);
        let phi = self.option_type.phi();

        let sqrt_t = t.sqrt();
        let dq = (-q * t).exp();
        let dr = (-r * t).exp();
        let f = s * ((r - q) * t).exp();
        let (d1, d2) = d1_d2(f, k, t, sigma);
        let nd1 = norm_cdf(phi * d1);
        let nd2 = norm_cdf(phi * d2);
        let pdf = norm_pdf(d1);

        Greeks {
            value: phi * (s * dq * nd1 - k * dr * nd2),
            delta: phi * dq * nd1,
            gamma: dq * pdf / (s * sigma * sqrt_t),
            vega: s * dq * pdf * sqrt_t,
            theta: -dq * s * pdf * sigma / (2.0 * sqrt_t) - phi * r * k * dr * nd2
                + phi * q * s * dq * nd1,
            rho: phi * k * t * dr * nd2,
            psi: -phi * s * t * dq * nd1,
        }
    }
}

/// Premiums for a batch of options, evaluated in parallel.
pub fn bs_value_batch(params: &[BsParams]) -> Vec<f64> {
    params.par_iter().map(BsParams::value).collect()
}

/// Greeks for a batch of options, evaluated in parallel.
pub fn bs_greeks_batch(params: &[BsParams]) -> Vec<Greeks> {
    params.par_iter().map(BsParams::greeks).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const S: f64 = 100.0;
    const K: f64 = 100.0;
    const T: f64 = 1.0;
    const R: f64 = 0.05;
    const Q: f64 = 0.01;
    const V: f64 = 0.30;

    #[test]
    fn test_reference_value() {
        let call = bs_value(S, T, K, R, Q, V, OptionType::Call);
        assert_relative_eq!(call, 13.616417377511802, epsilon = 1e-10);
        let delta = bs_delta(S, T, K, R, Q, V, OptionType::Call);
        assert_relative_eq!(delta, 0.6054544182296779, epsilon = 1e-10);
    }

    #[test]
    fn test_greeks_match_bumps() {
        for option_type in [OptionType::Call, OptionType::Put] {
            let value = |s: f64, t: f64, r: f64, q: f64, v: f64| bs_value(s, t, K, r, q, v, option_type);
            let h = 1e-4;

            let fd_delta = (value(S + h, T, R, Q, V) - value(S - h, T, R, Q, V)) / (2.0 * h);
            let fd_gamma = (value(S + 0.01, T, R, Q, V) - 2.0 * value(S, T, R, Q, V)
                + value(S - 0.01, T, R, Q, V))
                / 1e-4;
            let fd_vega = (value(S, T, R, Q, V + h) - value(S, T, R, Q, V - h)) / (2.0 * h);
            let fd_theta = -(value(S, T + h, R, Q, V) - value(S, T - h, R, Q, V)) / (2.0 * h);
            let fd_rho = (value(S, T, R + h, Q, V) - value(S, T, R - h, Q, V)) / (2.0 * h);
            let fd_psi = (value(S, T, R, Q + h, V) - value(S, T, R, Q - h, V)) / (2.0 * h);

            let g = BsParams::new(S, T, K, R, Q, V, option_type).greeks();
            assert_relative_eq!(g.delta, fd_delta, epsilon = 1e-6);
            assert_relative_eq!(g.gamma, fd_gamma, epsilon = 1e-5);
            assert_relative_eq!(g.vega, fd_vega, epsilon = 1e-5);
            assert_relative_eq!(g.theta, fd_theta, epsilon = 1e-5);
            assert_relative_eq!(g.rho, fd_rho, epsilon = 1e-5);
            assert_relative_eq!(g.psi, fd_psi, epsilon = 1e-5);

            assert_relative_eq!(g.delta, bs_delta(S, T, K, R, Q, V, option_type), epsilon = 1e-14);
            assert_relative_eq!(g.theta, bs_theta(S, T, K, R, Q, V, option_type), epsilon = 1e-12);
            assert_relative_eq!(g.rho, bs_rho(S, T, K, R, Q, V, option_type), epsilon = 1e-12);
            assert_relative_eq!(g.psi, bs_psi(S, T, K, R, Q, V, option_type), epsilon = 1e-12);
            assert_relative_eq!(g.gamma, bs_gamma(S, T, K, R, Q, V, option_type), epsilon = 1e-14);
            assert_relative_eq!(g.vega, bs_vega(S, T, K, R, Q, V, option_type), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_expired_and_zero_vol_return_intrinsic() {
        let itm = bs_value(110.0, 0.0, 100.0, R, Q, V, OptionType::Call);
        assert_relative_eq!(itm, 10.0, epsilon = 1e-8);
        let zero_vol = bs_value(110.0, 1.0, 100.0, R, Q, 0.0, OptionType::Call);
        let intrinsic = bs_intrinsic(110.0, 1.0, 100.0, R, Q, OptionType::Call);
        assert_relative_eq!(zero_vol, intrinsic, epsilon = 1e-8);
        assert_eq!(bs_value(90.0, 1.0, 100.0, 0.0, 0.0, 0.0, OptionType::Call), 0.0);
    }

    #[test]
    fn test_delivery_discounts_to_payment() {
        let at_expiry = bs_value(S, T, K, R, Q, V, OptionType::Call);
        let delayed = bs_value_delivery(S, T, K, R, Q, V, OptionType::Call, T);
        assert_relative_eq!(at_expiry, delayed, epsilon = 1e-14);
        let later = bs_value_delivery(S, T, K, R, Q, V, OptionType::Call, T + 2.0 / 365.0);
        assert!(later > 0.0 && (later - at_expiry).abs() < 0.1);
    }

    #[test]
    fn test_batch_matches_scalar() {
        let params: Vec<BsParams> = (0..50)
            .map(|i| BsParams::new(80.0 + f64::from(i), T, K, R, Q, V, OptionType::Put))
            .collect();
        let values = bs_value_batch(&params);
        let greeks = bs_greeks_batch(&params);
        for ((p, v), g) in params.iter().zip(&values).zip(&greeks) {
            assert_relative_eq!(*v, p.value(), epsilon = 1e-14);
            assert_relative_eq!(g.value, *v, epsilon = 1e-10);
        }
    }
}
