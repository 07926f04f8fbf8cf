//! Continuously monitored barrier options and touch contracts.
//!
//! `Analytic` uses the reflection formulas. `MonteCarlo` monitors the
//! barrier on the simulation grid with the Broadie–Glasserman–Kou shift
//! `H·e^{∓0.5826·σ√Δt}` toward the spot, which approximates continuous
//! monitoring with a discrete grid.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use strike_core::types::OptionType;
use strike_core::Date;
use strike_mc::{Gbm, McConfig, McEstimate, PathPayoff};
use strike_options::barrier::{BarrierDirection, BarrierOption, BarrierStyle, OneTouch, TouchPayment};
use strike_options::black_scholes::bs_value;

use super::{estimate, uniform_grid, BsInputs};
use crate::error::{require_positive, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// `ζ(1/2)/√(2π)`.
const CONTINUITY_SHIFT: f64 = 0.5826;

fn shifted_barrier(barrier: f64, direction: BarrierDirection, sigma: f64, dt: f64) -> f64 {
    let shift = CONTINUITY_SHIFT * sigma * dt.sqrt();
    match direction {
        BarrierDirection::Up => barrier * (-shift).exp(),
        BarrierDirection::Down => barrier * shift.exp(),
    }
}

/// A single-barrier European option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: f64,
    /// Barrier level.
    pub barrier: f64,
    /// Up or down.
    pub direction: BarrierDirection,
    /// Knock-in or knock-out.
    pub style: BarrierStyle,
    /// Cash rebate: at hit for knock-outs, at expiry for unexercised knock-ins.
    #[serde(default)]
    pub rebate: f64,
    /// Expiry date.
    pub expiry: Date,
    /// Index of the underlying in the market state.
    #[serde(default)]
    pub asset: usize,
}

impl Barrier {
    /// Creates a barrier option without rebate on the first asset.
    pub fn new(
        option_type: OptionType,
        strike: f64,
        barrier: f64,
        direction: BarrierDirection,
        style: BarrierStyle,
        expiry: Date,
    ) -> Self {
        Self {
            option_type,
            strike,
            barrier,
            direction,
            style,
            rebate: 0.0,
            expiry,
            asset: 0,
        }
    }

    /// Sets the rebate.
    #[must_use]
    pub fn with_rebate(mut self, rebate: f64) -> Self {
        self.rebate = rebate;
        self
    }

    fn kernel(&self) -> BarrierOption {
        BarrierOption::new(self.option_type, self.strike, self.barrier, self.direction, self.style)
            .with_rebate(self.rebate)
    }

    fn inputs(&self, market: &MarketState) -> PricingResult<BsInputs> {
        require_positive("strike", self.strike)?;
        require_positive("barrier", self.barrier)?;
        BsInputs::read(market, self.asset, self.strike, self.expiry, self.name())
    }

    /// Monte Carlo estimate on `config.num_steps` monitoring dates.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        let x = self.inputs(market)?;
        if self.direction.is_breached(x.s, self.barrier) {
            let value = match self.style {
                BarrierStyle::In => bs_value(x.s, x.t, self.strike, x.r, x.q, x.sigma, self.option_type),
                BarrierStyle::Out => self.rebate,
            };
            return Ok(McEstimate::from_samples(&[value]));
        }
        let times = uniform_grid(x.t, config.num_steps);
        let dt = x.t / times.len() as f64;
        let payoff = BarrierPath {
            contract: *self,
            level: shifted_barrier(self.barrier, self.direction, x.sigma, dt),
            rate: x.r,
            times,
        };
        let gbm = Gbm::new(x.s, x.drift(), x.sigma)?;
        let samples = gbm.evaluate_on_grid(&payoff.times, config, &payoff)?;
        Ok(estimate(&samples, config))
    }
}

/// Discounted barrier payoff along a path.
struct BarrierPath {
    contract: Barrier,
    level: f64,
    rate: f64,
    times: Vec<f64>,
}

impl BarrierPath {
    fn discount(&self, step: usize) -> f64 {
        (-self.rate * self.times[step - 1]).exp()
    }
}

impl PathPayoff for BarrierPath {
    type State = bool;

    fn start(&self) -> Self::State {
        false
    }

    fn observe(&self, touched: &mut bool, step: usize, prices: &[f64]) -> ControlFlow<f64> {
        if self.contract.direction.is_breached(prices[0], self.level) {
            if self.contract.style == BarrierStyle::Out {
                return ControlFlow::Break(self.contract.rebate * self.discount(step));
            }
            *touched = true;
        }
        ControlFlow::Continue(())
    }

    fn finish(&self, touched: bool, prices: &[f64]) -> f64 {
        let df = self.discount(self.times.len());
        let c = &self.contract;
        match (c.style, touched) {
            (BarrierStyle::In, false) => c.rebate * df,
            _ => c.option_type.payoff(prices[0], c.strike) * df,
        }
    }
}

impl Pricer for Barrier {
    fn name(&self) -> &'static str {
        match (self.direction, self.style) {
            (BarrierDirection::Up, BarrierStyle::In) => "up-and-in option",
            (BarrierDirection::Up, BarrierStyle::Out) => "up-and-out option",
            (BarrierDirection::Down, BarrierStyle::In) => "down-and-in option",
            (BarrierDirection::Down, BarrierStyle::Out) => "down-and-out option",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Analytic => {
                let x = self.inputs(market)?;
                Ok(self.kernel().value(x.s, x.t, x.r, x.q, x.sigma)?)
            }
            Model::MonteCarlo(config) => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}

/// A one-touch or no-touch paying cash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchOption {
    /// Barrier level.
    pub barrier: f64,
    /// Cash paid.
    pub payout: f64,
    /// Up or down.
    pub direction: BarrierDirection,
    /// Payment timing of the one-touch; no-touches pay at expiry.
    #[serde(default)]
    pub payment: TouchPayment,
    /// Pays if the barrier is never touched.
    #[serde(default)]
    pub no_touch: bool,
    /// Expiry date.
    pub expiry: Date,
    /// Index of the underlying in the market state.
    #[serde(default)]
    pub asset: usize,
}

impl TouchOption {
    /// One-touch on the first asset.
    pub fn one_touch(
        barrier: f64,
        payout: f64,
        direction: BarrierDirection,
        payment: TouchPayment,
        expiry: Date,
    ) -> Self {
        Self {
            barrier,
            payout,
            direction,
            payment,
            no_touch: false,
            expiry,
            asset: 0,
        }
    }

    /// No-touch on the first asset.
    pub fn no_touch(barrier: f64, payout: f64, direction: BarrierDirection, expiry: Date) -> Self {
        Self {
            no_touch: true,
            ..Self::one_touch(barrier, payout, direction, TouchPayment::AtExpiry, expiry)
        }
    }

    fn inputs(&self, market: &MarketState) -> PricingResult<BsInputs> {
        require_positive("barrier", self.barrier)?;
        BsInputs::read(market, self.asset, self.barrier, self.expiry, self.name())
    }

    /// Monte Carlo estimate on `config.num_steps` monitoring dates.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        let x = self.inputs(market)?;
        let times = uniform_grid(x.t, config.num_steps);
        let dt = x.t / times.len() as f64;
        let payoff = TouchPath {
            contract: *self,
            level: shifted_barrier(self.barrier, self.direction, x.sigma, dt),
            rate: x.r,
            times,
        };
        if self.direction.is_breached(x.s, self.barrier) {
            return Ok(McEstimate::from_samples(&[payoff.touched_at(0.0)]));
        }
        let gbm = Gbm::new(x.s, x.drift(), x.sigma)?;
        let samples = gbm.evaluate_on_grid(&payoff.times, config, &payoff)?;
        Ok(estimate(&samples, config))
    }
}

struct TouchPath {
    contract: TouchOption,
    level: f64,
    rate: f64,
    times: Vec<f64>,
}

impl TouchPath {
    fn expiry(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Discounted value once the barrier trades at time `t`.
    fn touched_at(&self, t: f64) -> f64 {
        let c = &self.contract;
        if c.no_touch {
            return 0.0;
        }
        let pay_time = match c.payment {
            TouchPayment::AtHit => t,
            TouchPayment::AtExpiry => self.expiry(),
        };
        c.payout * (-self.rate * pay_time).exp()
    }
}

impl PathPayoff for TouchPath {
    type State = ();

    fn start(&self) -> Self::State {}

    fn observe(&self, _state: &mut Self::State, step: usize, prices: &[f64]) -> ControlFlow<f64> {
        if self.contract.direction.is_breached(prices[0], self.level) {
            ControlFlow::Break(self.touched_at(self.times[step - 1]))
        } else {
            ControlFlow::Continue(())
        }
    }

    fn finish(&self, _state: Self::State, _prices: &[f64]) -> f64 {
        if self.contract.no_touch {
            self.contract.payout * (-self.rate * self.expiry()).exp()
        } else {
            0.0
        }
    }
}

impl Pricer for TouchOption {
    fn name(&self) -> &'static str {
        if self.no_touch {
            "no-touch"
        } else {
            "one-touch"
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Analytic => {
                let x = self.inputs(market)?;
                let kernel = OneTouch::new(self.barrier, self.payout, self.direction, self.payment);
                if self.no_touch {
                    Ok(kernel.no_touch_value(x.s, x.t, x.r, x.q, x.sigma)?)
                } else {
                    Ok(kernel.value(x.s, x.t, x.r, x.q, x.sigma)?)
                }
            }
            Model::MonteCarlo(config) => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equity::VanillaOption;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market(spot: f64) -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.05)))
            .add_flat_vol_asset(spot, 0.0, 0.25)
            .unwrap()
    }

    fn expiry() -> Date {
        today().add_days(365)
    }

    #[test]
    fn test_in_out_parity() {
        let m = market(100.0);
        let down_in = Barrier::new(OptionType::Call, 100.0, 85.0, BarrierDirection::Down, BarrierStyle::In, expiry());
        let down_out = Barrier {
            style: BarrierStyle::Out,
            ..down_in
        };
        let vanilla = VanillaOption::european(OptionType::Call, 100.0, expiry())
            .value(&m, &Model::Analytic)
            .unwrap();
        let parity = down_in.value(&m, &Model::Analytic).unwrap() + down_out.value(&m, &Model::Analytic).unwrap();
        assert_relative_eq!(parity, vanilla, epsilon = 1e-10);
    }

    #[test]
    fn test_monte_carlo_tracks_continuous_barrier() {
        let m = market(100.0);
        let up_out = Barrier::new(OptionType::Call, 100.0, 130.0, BarrierDirection::Up, BarrierStyle::Out, expiry());
        let analytic = up_out.value(&m, &Model::Analytic).unwrap();
        let est = up_out.value_mc(&m, &McConfig::new(20_000, 252, 3)).unwrap();
        assert!((est.value - analytic).abs() < 4.0 * est.std_error + 0.02 * analytic, "{est:?} vs {analytic}");
    }

    #[test]
    fn test_breached_knock_out_pays_rebate() {
        let m = market(80.0);
        let down_out = Barrier::new(OptionType::Call, 100.0, 85.0, BarrierDirection::Down, BarrierStyle::Out, expiry())
            .with_rebate(2.0);
        assert_relative_eq!(down_out.value(&m, &Model::Analytic).unwrap(), 2.0);
        let mc = Model::MonteCarlo(McConfig::new(100, 10, 1));
        assert_relative_eq!(down_out.value(&m, &mc).unwrap(), 2.0);
    }

    #[test]
    fn test_touch_and_no_touch_sum_to_bond() {
        let m = market(100.0);
        let one = TouchOption::one_touch(120.0, 1.0, BarrierDirection::Up, TouchPayment::AtExpiry, expiry());
        let none = TouchOption::no_touch(120.0, 1.0, BarrierDirection::Up, expiry());
        let total = one.value(&m, &Model::Analytic).unwrap() + none.value(&m, &Model::Analytic).unwrap();
        assert_relative_eq!(total, (-0.05_f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_touch_monte_carlo() {
        let m = market(100.0);
        let one = TouchOption::one_touch(115.0, 1.0, BarrierDirection::Up, TouchPayment::AtHit, expiry());
        let analytic = one.value(&m, &Model::Analytic).unwrap();
        let est = one.value_mc(&m, &McConfig::new(20_000, 252, 9)).unwrap();
        assert!((est.value - analytic).abs() < 4.0 * est.std_error + 0.01, "{est:?} vs {analytic}");
    }
}
