//! Equity and FX option pricers.

pub mod barrier;
pub mod basket;
pub mod convertible;
pub mod digital;
pub mod fx;
pub mod snowball;
pub mod vanilla;

pub use barrier::{Barrier, TouchOption};
pub use basket::BasketOption;
pub use convertible::ConvertibleBond;
pub use digital::{DigitalOption, DigitalPayout};
pub use fx::FxOption;
pub use snowball::{KnockInPayoff, Snowball};
pub use vanilla::VanillaOption;

use strike_core::Date;
use strike_mc::{McConfig, McEstimate};

use crate::error::{PricingError, PricingResult};
use crate::market::MarketState;

/// Black–Scholes inputs of one underlying read from the market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BsInputs {
    pub s: f64,
    pub t: f64,
    pub r: f64,
    pub q: f64,
    pub sigma: f64,
}

impl BsInputs {
    /// Reads spot, rates and the vol at `strike` for an option expiring on
    /// `expiry`.
    pub fn read(market: &MarketState, asset: usize, strike: f64, expiry: Date, name: &str) -> PricingResult<Self> {
        let t = alive(market, expiry, name)?;
        Ok(Self {
            s: market.spot(asset)?,
            t,
            r: market.rate_to(expiry),
            q: market.carry_to(asset, expiry)?,
            sigma: market.vol(asset, strike, expiry)?,
        })
    }

    /// Risk-neutral drift `r − q`.
    pub fn drift(&self) -> f64 {
        self.r - self.q
    }

    pub fn df(&self) -> f64 {
        (-self.r * self.t).exp()
    }
}

/// Option time to `expiry`, failing when it is not after the valuation date.
pub(crate) fn alive(market: &MarketState, expiry: Date, name: &str) -> PricingResult<f64> {
    if expiry <= market.valuation_date() {
        return Err(PricingError::expired(name, expiry, market.valuation_date()));
    }
    Ok(market.time_to(expiry))
}

/// Combines per-path values into an estimate honouring antithetic pairing.
pub(crate) fn estimate(samples: &[f64], config: &McConfig) -> McEstimate {
    if config.antithetic {
        McEstimate::from_antithetic(samples)
    } else {
        McEstimate::from_samples(samples)
    }
}

/// Uniform grid of `steps` times over `(0, t]`.
pub(crate) fn uniform_grid(t: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    (1..=steps).map(|k| t * k as f64 / steps as f64).collect()
}
