//! Finite-difference sensitivities through market overrides.
//!
//! Every Greek reprices the instrument on a bumped copy of the market, so
//! any [`Pricer`] gets risk without closed forms. The base valuation runs
//! first and its failure is returned unchanged.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RiskSettings;
use crate::error::PricingResult;
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// Bump-and-reprice sensitivities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FdGreeks {
    /// Base value.
    pub value: f64,
    /// `∂V/∂S` of the first asset; `None` when the market has no assets.
    pub delta: Option<f64>,
    /// `∂²V/∂S²` of the first asset.
    pub gamma: Option<f64>,
    /// `∂V/∂σ` for a parallel shift of every vol surface.
    pub vega: f64,
    /// `∂V/∂r` for a parallel shift of the zero rates.
    pub rho: f64,
    /// Value change per year of calendar time.
    pub theta: f64,
}

/// Bump-and-reprice engine for one market and model.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference<'a> {
    market: &'a MarketState,
    model: &'a Model,
    settings: RiskSettings,
}

impl<'a> FiniteDifference<'a> {
    /// Engine with the given bump sizes.
    pub fn new(market: &'a MarketState, model: &'a Model, settings: RiskSettings) -> Self {
        Self {
            market,
            model,
            settings,
        }
    }

    fn central<P: Pricer + ?Sized>(
        &self,
        pricer: &P,
        up: &MarketState,
        down: &MarketState,
        width: f64,
    ) -> PricingResult<f64> {
        Ok((pricer.value(up, self.model)? - pricer.value(down, self.model)?) / width)
    }

    /// Spot delta of asset `asset`.
    pub fn delta<P: Pricer + ?Sized>(&self, pricer: &P, asset: usize) -> PricingResult<f64> {
        let s = self.market.spot(asset)?;
        let h = s * self.settings.spot_bump;
        let up = self.market.with_spot(asset, s + h)?;
        let down = self.market.with_spot(asset, s - h)?;
        self.central(pricer, &up, &down, 2.0 * h)
    }

    /// Spot gamma of asset `asset` around `base`.
    pub fn gamma<P: Pricer + ?Sized>(&self, pricer: &P, asset: usize, base: f64) -> PricingResult<f64> {
        let s = self.market.spot(asset)?;
        let h = s * self.settings.spot_bump;
        let up = pricer.value(&self.market.with_spot(asset, s + h)?, self.model)?;
        let down = pricer.value(&self.market.with_spot(asset, s - h)?, self.model)?;
        Ok((up - 2.0 * base + down) / (h * h))
    }

    /// Vega for a parallel vol shift.
    pub fn vega<P: Pricer + ?Sized>(&self, pricer: &P) -> PricingResult<f64> {
        let h = self.settings.vol_bump;
        self.central(pricer, &self.market.shifted_vols(h), &self.market.shifted_vols(-h), 2.0 * h)
    }

    /// Rho for a parallel shift of the discount and projection curves.
    pub fn rho<P: Pricer + ?Sized>(&self, pricer: &P) -> PricingResult<f64> {
        let h = self.settings.rate_bump;
        self.central(pricer, &self.market.shifted_rates(h), &self.market.shifted_rates(-h), 2.0 * h)
    }

    /// Theta from rolling the valuation date forward.
    pub fn theta<P: Pricer + ?Sized>(&self, pricer: &P, base: f64) -> PricingResult<f64> {
        let days = i64::from(self.settings.theta_days);
        let valuation = self.market.valuation_date();
        let rolled = self.market.rolled_to(valuation.add_days(days))?;
        let dt = self.market.time_to(rolled.valuation_date());
        Ok((pricer.value(&rolled, self.model)? - base) / dt)
    }

    /// Value and every sensitivity.
    pub fn greeks<P: Pricer + ?Sized>(&self, pricer: &P) -> PricingResult<FdGreeks> {
        let value = pricer.value(self.market, self.model)?;
        let (delta, gamma) = if self.market.num_assets() > 0 {
            (Some(self.delta(pricer, 0)?), Some(self.gamma(pricer, 0, value)?))
        } else {
            (None, None)
        };
        let greeks = FdGreeks {
            value,
            delta,
            gamma,
            vega: self.vega(pricer)?,
            rho: self.rho(pricer)?,
            theta: self.theta(pricer, value)?,
        };
        debug!(instrument = pricer.name(), model = self.model.name(), ?greeks, "finite-difference greeks");
        Ok(greeks)
    }
}

/// [`FiniteDifference::greeks`] with the given bump sizes.
pub fn fd_greeks<P: Pricer + ?Sized>(
    pricer: &P,
    market: &MarketState,
    model: &Model,
    settings: RiskSettings,
) -> PricingResult<FdGreeks> {
    FiniteDifference::new(market, model, settings).greeks(pricer)
}
