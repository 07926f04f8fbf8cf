//! Barone-Adesi–Whaley quadratic approximation for American options.
//!
//! The early exercise premium is approximated by `A·(S/S*)^q`, where the
//! critical price `S*` solves the smooth-pasting condition
//!
//! ```text
//! call:  S* − K = c(S*) + (1 − e^{−qT} N(d1(S*))) S*/q2
//! put:   K − S* = p(S*) − (1 − e^{−qT} N(−d1(S*))) S*/q1
//! ```
//!
//! The condition is solved by Newton-secant from the Barone-Adesi–Whaley
//! seed, with bisection as the fallback.

use tracing::debug;

use strike_core::types::OptionType;
use strike_math::distributions::norm_cdf;
use strike_math::solvers::{secant_with_fallback, SolverConfig};

use crate::black_scholes::{bs_value, d1_d2, EPSILON};
use crate::error::{require_finite, require_positive, OptionsError, OptionsResult};

/// Rates below this in magnitude use the `r → 0` limit of `2r/(σ²(1−e^{−rT}))`.
const ZERO_RATE: f64 = 1e-12;

/// The quadratic exponents `(q1, q2)` of the approximation.
fn exponents(t: f64, r: f64, q: f64, sigma: f64) -> (f64, f64) {
    let var = sigma * sigma;
    let n = 2.0 * (r - q) / var;
    let m_over_k = if r.abs() < ZERO_RATE {
        2.0 / (var * t)
    } else {
        2.0 * r / (var * (1.0 - (-r * t).exp()))
    };
    let root = ((n - 1.0) * (n - 1.0) + 4.0 * m_over_k).sqrt();
    (0.5 * (-(n - 1.0) - root), 0.5 * (-(n - 1.0) + root))
}

/// Seed for the critical price from the perpetual boundary.
fn seed(k: f64, t: f64, r: f64, q: f64, sigma: f64, option_type: OptionType) -> f64 {
    let var = sigma * sigma;
    let n = 2.0 * (r - q) / var;
    let m = 2.0 * r / var;
    let root = ((n - 1.0) * (n - 1.0) + 4.0 * m).sqrt();
    let b = r - q;
    let st = sigma * t.sqrt();
    match option_type {
        OptionType::Call => {
            let q_inf = 0.5 * (-(n - 1.0) + root);
            let s_inf = k / (1.0 - 1.0 / q_inf);
            let h2 = -(b * t + 2.0 * st) * k / (s_inf - k);
            k + (s_inf - k) * (1.0 - h2.exp())
        }
        OptionType::Put => {
            let q_inf = 0.5 * (-(n - 1.0) - root);
            let s_inf = k / (1.0 - 1.0 / q_inf);
            let h1 = (b * t - 2.0 * st) * k / (k - s_inf);
            s_inf + (k - s_inf) * h1.exp()
        }
    }
}

/// Critical exercise price and its early exercise coefficient `A`.
fn critical_price(
    k: f64,
    t: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
) -> OptionsResult<(f64, f64)> {
    let (q1, q2) = exponents(t, r, q, sigma);
    let phi = option_type.phi();
    let q_phi = match option_type {
        OptionType::Call => q2,
        OptionType::Put => q1,
    };
    let carry_df = (-q * t).exp();

    // Exercise premium coefficient at a trial boundary.
    let coefficient = |s_star: f64| {
        let f = s_star * ((r - q) * t).exp();
        let (d1, _) = d1_d2(f, k, t, sigma);
        phi * (s_star / q_phi) * (1.0 - carry_df * norm_cdf(phi * d1))
    };
    let matching = |s_star: f64| {
        phi * (s_star - k) - bs_value(s_star, t, k, r, q, sigma, option_type) - coefficient(s_star)
    };

    let start = seed(k, t, r, q, sigma, option_type);
    let bounds = match option_type {
        OptionType::Call => (k * (1.0 + 1e-8), k * 10.0),
        OptionType::Put => (k * 1e-4, k * (1.0 - 1e-8)),
    };
    let guess = if start.is_finite() && start > 0.0 {
        start
    } else {
        k
    };
    let result = secant_with_fallback(matching, guess, Some(bounds), &SolverConfig::new(1e-10, 50))
        .map_err(|source| OptionsError::SolveFailed {
            what: "critical price",
            source,
        })?;
    debug!(
        seed = guess,
        critical = result.root,
        iterations = result.iterations,
        "BAW critical price"
    );
    Ok((result.root, coefficient(result.root)))
}

/// Barone-Adesi–Whaley value of an American option.
///
/// A call on an asset with `q ≤ 0` and a put with `r ≤ 0` are never
/// exercised early and return the Black–Scholes value.
pub fn baw_value(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
) -> OptionsResult<f64> {
    require_positive("spot", s)?;
    require_positive("strike", k)?;
    require_finite("rate", r)?;
    require_finite("dividend yield", q)?;
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(OptionsError::invalid_input(format!(
            "volatility must be non-negative, got {sigma}"
        )));
    }
    if t <= EPSILON || sigma <= EPSILON {
        let european = bs_value(s, t, k, r, q, sigma, option_type);
        return Ok(european.max(option_type.payoff(s, k)));
    }

    let european = bs_value(s, t, k, r, q, sigma, option_type);
    let no_early_exercise = match option_type {
        OptionType::Call => q <= 0.0,
        OptionType::Put => r <= 0.0,
    };
    if no_early_exercise {
        return Ok(european);
    }

    let (q1, q2) = exponents(t, r, q, sigma);
    let (s_star, a) = critical_price(k, t, r, q, sigma, option_type)?;
    let value = match option_type {
        OptionType::Call if s < s_star => european + a * (s / s_star).powf(q2),
        OptionType::Put if s > s_star => european + a * (s / s_star).powf(q1),
        _ => option_type.payoff(s, k),
    };
    Ok(value.max(option_type.payoff(s, k)))
}

/// Early exercise premium over the European value.
pub fn baw_early_exercise_premium(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    sigma: f64,
    option_type: OptionType,
) -> OptionsResult<f64> {
    let american = baw_value(s, t, k, r, q, sigma, option_type)?;
    Ok(american - bs_value(s, t, k, r, q, sigma, option_type))
}
