//! Forward-measure option formulas: Black-76, shifted Black and Bachelier.
//!
//! All take the forward `f`, the strike, the time to expiry, a volatility
//! and the discount factor to the payment date, which keeps them usable for
//! caplets and swaptions where the "discount" is an annuity.

use strike_core::types::OptionType;
use strike_math::distributions::{norm_cdf, norm_pdf};

use crate::black_scholes::{d1_d2, EPSILON};
use crate::error::{OptionsError, OptionsResult};
use crate::implied_vol::bs_implied_vol;

/// Black-76 premium `df · φ(F N(φd1) − K N(φd2))`.
pub fn black_value(f: f64, k: f64, t: f64, sigma: f64, df: f64, option_type: OptionType) -> f64 {
    if f <= 0.0 || k <= 0.0 {
        return df * option_type.payoff(f, k);
    }
    let phi = option_type.phi();
    let (d1, d2) = d1_d2(f, k, t.max(EPSILON), sigma.max(EPSILON));
    phi * df * (f * norm_cdf(phi * d1) - k * norm_cdf(phi * d2))
}

/// Sensitivity of [`black_value`] to the forward.
pub fn black_delta(f: f64, k: f64, t: f64, sigma: f64, df: f64, option_type: OptionType) -> f64 {
    let phi = option_type.phi();
    if f <= 0.0 || k <= 0.0 {
        return if option_type.payoff(f, k) > 0.0 { phi * df } else { 0.0 };
    }
    let (d1, _) = d1_d2(f, k, t.max(EPSILON), sigma.max(EPSILON));
    phi * df * norm_cdf(phi * d1)
}

/// Sensitivity of [`black_value`] to the volatility.
pub fn black_vega(f: f64, k: f64, t: f64, sigma: f64, df: f64) -> f64 {
    let t = t.max(EPSILON);
    let (d1, _) = d1_d2(f, k.max(EPSILON), t, sigma.max(EPSILON));
    df * f * norm_pdf(d1) * t.sqrt()
}

/// Black-76 on `F + shift` and `K + shift`, for rates that can go negative.
pub fn shifted_black_value(
    f: f64,
    k: f64,
    t: f64,
    sigma: f64,
    df: f64,
    shift: f64,
    option_type: OptionType,
) -> f64 {
    black_value(f + shift, k + shift, t, sigma, df, option_type)
}

/// Bachelier (normal) premium `df · (φ(F − K) N(φd) + σ√T n(d))` with
/// `d = (F − K)/(σ√T)`.
pub fn bachelier_value(f: f64, k: f64, t: f64, sigma_n: f64, df: f64, option_type: OptionType) -> f64 {
    let phi = option_type.phi();
    let st = sigma_n.max(EPSILON) * t.max(EPSILON).sqrt();
    let d = (f - k) / st;
    df * (phi * (f - k) * norm_cdf(phi * d) + st * norm_pdf(d))
}

/// Sensitivity of [`bachelier_value`] to the normal volatility.
pub fn bachelier_vega(f: f64, k: f64, t: f64, sigma_n: f64, df: f64) -> f64 {
    let t = t.max(EPSILON);
    let d = (f - k) / (sigma_n.max(EPSILON) * t.sqrt());
    df * t.sqrt() * norm_pdf(d)
}

/// Black-76 implied volatility of a premium discounted with `df`.
pub fn black_implied_vol(
    f: f64,
    k: f64,
    t: f64,
    df: f64,
    price: f64,
    option_type: OptionType,
) -> OptionsResult<f64> {
    if !df.is_finite() || df <= 0.0 {
        return Err(OptionsError::invalid_input(format!(
            "discount factor must be positive, got {df}"
        )));
    }
    bs_implied_vol(f, t, k, 0.0, 0.0, price / df, option_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes::bs_value;
    use approx::assert_relative_eq;

    #[test]
    fn test_black_matches_black_scholes_on_forward() {
        let (s, t, k, r, q, v): (f64, f64, f64, f64, f64, f64) = (100.0, 1.5, 95.0, 0.03, 0.01, 0.22);
        let f = s * ((r - q) * t).exp();
        let df = (-r * t).exp();
        for option_type in [OptionType::Call, OptionType::Put] {
            assert_relative_eq!(
                black_value(f, k, t, v, df, option_type),
                bs_value(s, t, k, r, q, v, option_type),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_black_parity_and_vega() {
        let (f, k, t, v, df) = (0.03, 0.025, 2.0, 0.3, 0.95);
        let call = black_value(f, k, t, v, df, OptionType::Call);
        let put = black_value(f, k, t, v, df, OptionType::Put);
        assert_relative_eq!(call - put, df * (f - k), epsilon = 1e-15);

        let h = 1e-6;
        let fd = (black_value(f, k, t, v + h, df, OptionType::Call)
            - black_value(f, k, t, v - h, df, OptionType::Call))
            / (2.0 * h);
        assert_relative_eq!(black_vega(f, k, t, v, df), fd, epsilon = 1e-9);
        let fd_delta = (black_value(f + h, k, t, v, df, OptionType::Put)
            - black_value(f - h, k, t, v, df, OptionType::Put))
            / (2.0 * h);
        assert_relative_eq!(black_delta(f, k, t, v, df, OptionType::Put), fd_delta, epsilon = 1e-7);
    }

    #[test]
    fn test_shifted_black_handles_negative_rates() {
        let value = shifted_black_value(-0.002, -0.001, 1.0, 0.2, 1.0, 0.03, OptionType::Call);
        assert!(value > 0.0 && value.is_finite());
        assert_eq!(black_value(-0.002, -0.001, 1.0, 0.2, 1.0, OptionType::Call), 0.0);
    }

    #[test]
    fn test_bachelier_atm_and_parity() {
        let (f, t, v, df) = (0.02, 4.0, 0.008, 0.9);
        let atm = bachelier_value(f, f, t, v, df, OptionType::Call);
        assert_relative_eq!(atm, df * v * t.sqrt() / (2.0 * std::f64::consts::PI).sqrt(), epsilon = 1e-15);
        let call = bachelier_value(f, 0.015, t, v, df, OptionType::Call);
        let put = bachelier_value(f, 0.015, t, v, df, OptionType::Put);
        assert_relative_eq!(call - put, df * (f - 0.015), epsilon = 1e-15);

        let h = 1e-7;
        let fd = (bachelier_value(f, 0.015, t, v + h, df, OptionType::Call)
            - bachelier_value(f, 0.015, t, v - h, df, OptionType::Call))
            / (2.0 * h);
        assert_relative_eq!(bachelier_vega(f, 0.015, t, v, df), fd, epsilon = 1e-7);
    }

    #[test]
    fn test_black_implied_vol_round_trip() {
        let price = black_value(0.031, 0.035, 5.0, 0.27, 4.2, OptionType::Call);
        let vol = black_implied_vol(0.031, 0.035, 5.0, 4.2, price, OptionType::Call).unwrap();
        assert_relative_eq!(vol, 0.27, epsilon = 1e-8);
    }
}
