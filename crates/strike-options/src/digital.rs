//! Cash-or-nothing and asset-or-nothing digitals with closed-form Greeks.
//!
//! Both follow the conventions of [`crate::black_scholes`]: continuous
//! rates, theta per year of calendar time, inputs clamped above
//! [`EPSILON`](crate::black_scholes::EPSILON).

use strike_core::types::OptionType;
use strike_math::distributions::{norm_cdf, norm_pdf};

use crate::black_scholes::{d1_d2, Greeks, EPSILON};

struct Terms {
    phi: f64,
    sqrt_t: f64,
    d1: f64,
    d2: f64,
    dr: f64,
    dq: f64,
    // (r − q)/(σ√T), the carry part of ∂d1/∂T and ∂d2/∂T
    drift: f64,
}

fn terms(s: f64, t: f64, k: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> (Terms, f64, f64) {
    let t = t.max(EPSILON);
    let k = k.max(EPSILON);
    let sigma = sigma.max(EPSILON);
    let f = s * ((r - q) * t).exp();
    let (d1, d2) = d1_d2(f, k, t, sigma);
    let sqrt_t = t.sqrt();
    (
        Terms {
            phi: option_type.phi(),
            sqrt_t,
            d1,
            d2,
            dr: (-r * t).exp(),
            dq: (-q * t).exp(),
            drift: (r - q) / (sigma * sqrt_t),
        },
        t,
        sigma,
    )
}

/// Cash-or-nothing digital paying `payout` at expiry if `φ(S_T − K) > 0`.
///
/// # Example
///
/// ```rust
/// use strike_core::types::OptionType;
/// use strike_options::digital::cash_or_nothing;
///
/// let call = cash_or_nothing(100.0, 1.0, 100.0, 0.05, 0.0, 0.2, OptionType::Call, 1.0);
/// let put = cash_or_nothing(100.0, 1.0, 100.0, 0.05, 0.0, 0.2, OptionType::Put, 1.0);
/// assert!((call.value + put.value - (-0.05f64).exp()).abs() < 1e-12);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn cash_or_nothing(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
    payout: f64,
) -> Greeks {
    let (x, t, sigma) = terms(s, t, k, r, q, sigma, option_type);
    let nd2 = norm_cdf(x.phi * x.d2);
    let pdf = norm_pdf(x.d2);
    let st = sigma * x.sqrt_t;
    let value = payout * x.dr * nd2;
    let dd2_dt = -x.d1 / (2.0 * t) + x.drift;

    Greeks {
        value,
        delta: payout * x.dr * x.phi * pdf / (s * st),
        gamma: -payout * x.dr * x.phi * pdf * x.d1 / (s * s * st * st),
        vega: -payout * x.dr * x.phi * pdf * x.d1 / sigma,
        theta: payout * x.dr * (r * nd2 - x.phi * pdf * dd2_dt),
        rho: -t * value + payout * x.dr * x.phi * pdf * x.sqrt_t / sigma,
        psi: -payout * x.dr * x.phi * pdf * x.sqrt_t / sigma,
    }
}

/// Asset-or-nothing digital delivering one unit of the asset at expiry if
/// `φ(S_T − K) > 0`.
pub fn asset_or_nothing(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
) -> Greeks {
    let (x, t, sigma) = terms(s, t, k, r, q, sigma, option_type);
    let nd1 = norm_cdf(x.phi * x.d1);
    let pdf = norm_pdf(x.d1);
    let st = sigma * x.sqrt_t;
    let value = s * x.dq * nd1;
    let dd1_dt = -x.d2 / (2.0 * t) + x.drift;

    Greeks {
        value,
        delta: x.dq * (nd1 + x.phi * pdf / st),
        gamma: x.dq * x.phi * pdf / (s * st) * (1.0 - x.d1 / st),
        vega: -x.phi * s * x.dq * pdf * x.d2 / sigma,
        theta: q * value - s * x.dq * x.phi * pdf * dd1_dt,
        rho: s * x.dq * x.phi * pdf * x.sqrt_t / sigma,
        psi: -t * value - s * x.dq * x.phi * pdf * x.sqrt_t / sigma,
    }
}
