//! Black–Scholes implied volatility.
//!
//! The premium is first mapped onto the out-of-the-money option through
//! put–call parity, which is where the inversion is best conditioned. Its
//! time value must be non-negative and below the no-arbitrage bound.
//! Newton iteration on vega starts from Hallerbach's closed-form estimate
//! and falls back to bisection on `[1e-4, 10]`.

use tracing::debug;

use strike_core::types::OptionType;
use strike_math::solvers::{newton_with_fallback, SolverConfig};

use crate::black_scholes::{bs_value, bs_vega};
use crate::error::{require_finite, require_positive, OptionsError, OptionsResult};

/// Lower end of the volatility search interval.
pub const VOL_LOWER_BOUND: f64 = 1e-4;

/// Upper end of the volatility search interval.
pub const VOL_UPPER_BOUND: f64 = 10.0;

/// Time values at or below this are treated as zero.
const ZERO_TIME_VALUE: f64 = 1e-14;

/// Default solver settings for implied volatility.
pub fn default_config() -> SolverConfig {
    SolverConfig::new(1e-12, 50)
}

/// Implied volatility of a European option premium.
///
/// # Example
///
/// ```rust
/// use strike_core::types::OptionType;
/// use strike_options::black_scholes::bs_value;
/// use strike_options::implied_vol::bs_implied_vol;
///
/// let price = bs_value(100.0, 1.0, 100.0, 0.05, 0.01, 0.30, OptionType::Call);
/// let vol = bs_implied_vol(100.0, 1.0, 100.0, 0.05, 0.01, price, OptionType::Call).unwrap();
/// assert!((vol - 0.30).abs() < 1e-6);
/// ```
pub fn bs_implied_vol(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    price: f64,
    option_type: OptionType,
) -> OptionsResult<f64> {
    bs_implied_vol_with_config(s, t, k, r, q, price, option_type, &default_config())
}

/// [`bs_implied_vol`] with explicit solver settings.
#[allow(clippy::too_many_arguments)]
pub fn bs_implied_vol_with_config(
    s: f64,
    t: f64,
    k: f64,
    r: f64,
    q: f64,
    price: f64,
    option_type: OptionType,
    config: &SolverConfig,
) -> OptionsResult<f64> {
    require_positive("spot", s)?;
    require_positive("strike", k)?;
    require_finite("rate", r)?;
    require_finite("dividend yield", q)?;
    require_finite("price", price)?;
    if price < 0.0 {
        return Err(OptionsError::invalid_input(format!(
            "price must be non-negative, got {price}"
        )));
    }
    if !t.is_finite() || t <= 0.0 {
        return Err(OptionsError::Expired { time_to_expiry: t });
    }

    let spot_leg = s * (-q * t).exp();
    let strike_leg = k * (-r * t).exp();
    let call_minus_put = spot_leg - strike_leg;

    // Forward above strike makes the call in the money; invert the put.
    let otm = if call_minus_put > 0.0 {
        OptionType::Put
    } else {
        OptionType::Call
    };
    let time_value = if option_type == otm {
        price
    } else {
        price - option_type.phi() * call_minus_put
    };

    let scale = price.max(s).max(k);
    if time_value < -ZERO_TIME_VALUE * scale {
        return Err(OptionsError::NegativeTimeValue { price, time_value });
    }
    if time_value <= ZERO_TIME_VALUE * scale {
        return Ok(0.0);
    }
    let bound = match otm {
        OptionType::Call => spot_leg,
        OptionType::Put => strike_leg,
    };
    if time_value >= bound {
        return Err(OptionsError::AboveUpperBound { price, bound });
    }

    let call_price = match otm {
        OptionType::Call => time_value,
        OptionType::Put => time_value + call_minus_put,
    };
    let guess = hallerbach_guess(spot_leg, strike_leg, call_price, t);

    let f = |sigma: f64| bs_value(s, t, k, r, q, sigma, otm) - time_value;
    let df = |sigma: f64| bs_vega(s, t, k, r, q, sigma, otm);
    let result = newton_with_fallback(
        f,
        df,
        guess,
        Some((VOL_LOWER_BOUND, VOL_UPPER_BOUND)),
        config,
    )
    .map_err(|source| OptionsError::ImpliedVolFailed { source })?;

    debug!(
        guess,
        vol = result.root,
        iterations = result.iterations,
        "implied volatility solved"
    );
    Ok(result.root)
}

/// Hallerbach (2004) closed-form estimate of the implied volatility of a
/// call worth `call` on discounted spot `spot_leg` and discounted strike
/// `strike_leg`.
///
/// Clamped to the search interval; 0.2 when the estimate is not finite.
pub fn hallerbach_guess(spot_leg: f64, strike_leg: f64, call: f64, t: f64) -> f64 {
    use std::f64::consts::PI;

    let sum = spot_leg + strike_leg;
    let a = 2.0 * call + strike_leg - spot_leg;
    let diff = strike_leg - spot_leg;
    let disc = a * a - 1.85 * sum * diff * diff / (PI * (strike_leg * spot_leg).sqrt());
    let guess = (2.0 * PI).sqrt() / (2.0 * sum) * (a + disc.max(0.0).sqrt()) / t.sqrt();
    if guess.is_finite() {
        guess.clamp(VOL_LOWER_BOUND, VOL_UPPER_BOUND)
    } else {
        0.2
    }
}
