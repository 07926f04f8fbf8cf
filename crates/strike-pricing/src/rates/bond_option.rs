//! Options on fixed-rate bonds and bonds with embedded calls and puts.
//!
//! Strikes and exercise prices apply to the value of the flows paid after
//! the exercise date, so an exercise on a coupon date compares against the
//! clean price.

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_core::types::{ExerciseType, OptionType};
use strike_core::Date;
use strike_math::solvers::{secant_with_fallback, SolverConfig};

use super::bond::{horizon, roll_cashflows, FixedRateBond};
use super::{curve_flows, fit_lattice};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::lattice::{HullWhiteAnalytic, RateLattice, ShortRateModel};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// An option on a fixed-rate bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondOption {
    /// Underlying bond.
    pub bond: FixedRateBond,
    /// Call or put on the bond.
    pub option_type: OptionType,
    /// Strike on the value of flows after exercise.
    pub strike: f64,
    /// Last exercise date.
    pub expiry: Date,
    /// European, American, or Bermudan on coupon dates.
    pub exercise: ExerciseType,
}

impl BondOption {
    /// European option.
    pub fn european(bond: FixedRateBond, option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            bond,
            option_type,
            strike,
            expiry,
            exercise: ExerciseType::European,
        }
    }

    /// American option.
    pub fn american(bond: FixedRateBond, option_type: OptionType, strike: f64, expiry: Date) -> Self {
        Self {
            exercise: ExerciseType::American,
            ..Self::european(bond, option_type, strike, expiry)
        }
    }

    fn check(&self, market: &MarketState) -> PricingResult<()> {
        require_positive("bond option strike", self.strike)?;
        if self.expiry <= market.valuation_date() {
            return Err(PricingError::expired(self.name(), self.expiry, market.valuation_date()));
        }
        if self.expiry >= self.bond.maturity {
            return Err(PricingError::invalid_input(format!(
                "option expiry {} is not before bond maturity {}",
                self.expiry, self.bond.maturity
            )));
        }
        Ok(())
    }

    fn hull_white_value(&self, market: &MarketState, a: f64, sigma: f64) -> PricingResult<f64> {
        let discount = |t: f64| market.discount_at(t);
        let model = HullWhiteAnalytic::new(a, sigma, &discount)?;
        let flows = curve_flows(market, &self.bond.cashflows_after(self.expiry)?);
        model.coupon_bond_option(
            market.curve_time_to(self.expiry),
            &flows,
            self.strike,
            self.option_type,
            &SolverConfig::default(),
        )
    }

    fn exercise_layers(&self, market: &MarketState, lattice: &RateLattice) -> PricingResult<Vec<usize>> {
        let last = lattice.step_of(market.curve_time_to(self.expiry));
        Ok(match self.exercise {
            ExerciseType::European => vec![last],
            ExerciseType::American => (1..=last).collect(),
            ExerciseType::Bermudan => {
                let mut layers: Vec<usize> = self
                    .bond
                    .cashflows()?
                    .iter()
                    .filter(|cf| cf.date > market.valuation_date() && cf.date < self.expiry)
                    .map(|cf| lattice.step_of(market.curve_time_to(cf.date)))
                    .collect();
                layers.push(last);
                layers
            }
        })
    }

    /// Value on a short-rate lattice.
    pub fn lattice_value(&self, market: &MarketState, model: &ShortRateModel, steps: usize) -> PricingResult<f64> {
        let flows = curve_flows(market, &self.bond.cashflows_after(market.valuation_date())?);
        let lattice = fit_lattice(market, model, horizon(&flows)?, steps)?;
        let layers = self.exercise_layers(market, &lattice)?;
        let last = layers.iter().copied().max().unwrap_or(0);

        let phi = self.option_type.phi();
        let mut intrinsic: Vec<Option<Vec<f64>>> = vec![None; last + 1];
        roll_cashflows(&lattice, &flows, market.credit_spread(), |i, bond| {
            if i <= last && layers.contains(&i) {
                intrinsic[i] = Some(bond.iter().map(|b| (phi * (b - self.strike)).max(0.0)).collect());
            }
        });

        let mut values = intrinsic[last].clone().unwrap_or_default();
        for i in (0..last).rev() {
            values = lattice.step_back(i, &values, 0.0);
            if let Some(exercise) = &intrinsic[i] {
                for (v, e) in values.iter_mut().zip(exercise) {
                    *v = v.max(*e);
                }
            }
        }
        Ok(values.first().copied().unwrap_or(0.0))
    }
}

impl Pricer for BondOption {
    fn name(&self) -> &'static str {
        match (self.exercise, self.option_type) {
            (ExerciseType::European, OptionType::Call) => "European bond call",
            (ExerciseType::European, OptionType::Put) => "European bond put",
            (_, OptionType::Call) => "early-exercise bond call",
            (_, OptionType::Put) => "early-exercise bond put",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        self.check(market)?;
        match model {
            Model::HullWhite {
                mean_reversion,
                volatility,
            } if self.exercise == ExerciseType::European => {
                self.hull_white_value(market, *mean_reversion, *volatility)
            }
            Model::ShortRateTree { model, steps } => self.lattice_value(market, model, *steps),
            _ => Err(self.mismatch(model)),
        }
    }
}

/// A dated exercise price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrice {
    /// Exercise date.
    pub date: Date,
    /// Price paid on exercise.
    pub price: f64,
}

/// A fixed-rate bond the issuer may call or the holder may put.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallableBond {
    /// Underlying bullet bond.
    pub bond: FixedRateBond,
    /// Issuer calls.
    #[serde(default)]
    pub calls: Vec<ExercisePrice>,
    /// Holder puts.
    #[serde(default)]
    pub puts: Vec<ExercisePrice>,
}

impl CallableBond {
    /// Bond without embedded options.
    pub fn new(bond: FixedRateBond) -> Self {
        Self {
            bond,
            calls: Vec::new(),
            puts: Vec::new(),
        }
    }

    /// Adds an issuer call.
    #[must_use]
    pub fn with_call(mut self, date: Date, price: f64) -> Self {
        self.calls.push(ExercisePrice { date, price });
        self
    }

    /// Adds a holder put.
    #[must_use]
    pub fn with_put(mut self, date: Date, price: f64) -> Self {
        self.puts.push(ExercisePrice { date, price });
        self
    }

    fn lattice_for(&self, market: &MarketState, model: &ShortRateModel, steps: usize) -> PricingResult<(RateLattice, Vec<(f64, f64)>)> {
        if self.bond.maturity <= market.valuation_date() {
            return Err(PricingError::expired(self.name(), self.bond.maturity, market.valuation_date()));
        }
        let flows = curve_flows(market, &self.bond.cashflows_after(market.valuation_date())?);
        let lattice = fit_lattice(market, model, horizon(&flows)?, steps)?;
        Ok((lattice, flows))
    }

    /// Per-layer exercise prices after valuation.
    fn layered(&self, market: &MarketState, lattice: &RateLattice, prices: &[ExercisePrice]) -> Vec<(usize, f64)> {
        prices
            .iter()
            .filter(|e| e.date > market.valuation_date())
            .map(|e| (lattice.step_of(market.curve_time_to(e.date)), e.price))
            .collect()
    }

    fn roll(&self, lattice: &RateLattice, flows: &[(f64, f64)], calls: &[(usize, f64)], puts: &[(usize, f64)], spread: f64) -> f64 {
        roll_cashflows(lattice, flows, spread, |i, values| {
            for (_, put) in puts.iter().filter(|(layer, _)| *layer == i) {
                for v in values.iter_mut() {
                    *v = v.max(*put);
                }
            }
            for (_, call) in calls.iter().filter(|(layer, _)| *layer == i) {
                for v in values.iter_mut() {
                    *v = v.min(*call);
                }
            }
        })
    }

    /// Dirty value on a lattice with the credit spread plus `oas`.
    pub fn lattice_value(&self, market: &MarketState, model: &ShortRateModel, steps: usize, oas: f64) -> PricingResult<f64> {
        let (lattice, flows) = self.lattice_for(market, model, steps)?;
        let calls = self.layered(market, &lattice, &self.calls);
        let puts = self.layered(market, &lattice, &self.puts);
        Ok(self.roll(&lattice, &flows, &calls, &puts, market.credit_spread() + oas))
    }

    /// Option-adjusted spread reproducing `dirty_price`.
    pub fn oas(
        &self,
        market: &MarketState,
        model: &ShortRateModel,
        steps: usize,
        dirty_price: f64,
        config: &SolverConfig,
    ) -> PricingResult<f64> {
        require_positive("dirty price", dirty_price)?;
        let (lattice, flows) = self.lattice_for(market, model, steps)?;
        let calls = self.layered(market, &lattice, &self.calls);
        let puts = self.layered(market, &lattice, &self.puts);
        let base = market.credit_spread();
        let result = secant_with_fallback(
            |s| self.roll(&lattice, &flows, &calls, &puts, base + s) - dirty_price,
            0.0,
            Some((-0.05, 0.2)),
            config,
        )
        .map_err(|source| PricingError::SolveFailed { what: "OAS", source })?;
        debug!(oas = result.root, iterations = result.iterations, "option-adjusted spread");
        Ok(result.root)
    }
}

impl Pricer for CallableBond {
    fn name(&self) -> &'static str {
        match (self.calls.is_empty(), self.puts.is_empty()) {
            (false, true) => "callable bond",
            (true, false) => "puttable bond",
            (false, false) => "callable puttable bond",
            (true, true) => "bond on lattice",
        }
    }

    /// Dirty value.
    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::ShortRateTree { model, steps } => self.lattice_value(market, model, *steps, 0.0),
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_core::types::Frequency;
    use strike_curves::curves::FlatCurve;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn today() -> Date {
        date(2025, 1, 2)
    }

    fn market() -> MarketState {
        MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.04)))
    }

    fn bond() -> FixedRateBond {
        FixedRateBond::new(100.0, 0.045, Frequency::Annual, date(2024, 7, 2), date(2034, 7, 3))
    }

    fn hw() -> Model {
        Model::HullWhite {
            mean_reversion: 0.05,
            volatility: 0.01,
        }
    }

    fn tree(kind: ShortRateModel) -> Model {
        Model::ShortRateTree { model: kind, steps: 400 }
    }

    #[test]
    fn test_european_put_call_parity() {
        let m = market();
        let expiry = date(2027, 1, 4);
        let call = BondOption::european(bond(), OptionType::Call, 100.0, expiry);
        let put = BondOption::european(bond(), OptionType::Put, 100.0, expiry);
        let c = call.value(&m, &hw()).unwrap();
        let p = put.value(&m, &hw()).unwrap();
        let forward: f64 = curve_flows(&m, &bond().cashflows_after(expiry).unwrap())
            .iter()
            .map(|(t, cf)| cf * m.discount_at(*t))
            .sum();
        assert_relative_eq!(c - p, forward - 100.0 * m.df(expiry), epsilon = 1e-8);
    }

    #[test]
    fn test_tree_matches_hull_white() {
        let m = market();
        let option = BondOption::european(bond(), OptionType::Call, 101.0, date(2027, 1, 4));
        let analytic = option.value(&m, &hw()).unwrap();
        let lattice = option.value(&m, &tree(ShortRateModel::hull_white(0.05, 0.01))).unwrap();
        assert_relative_eq!(lattice, analytic, max_relative = 0.03);
    }

    #[test]
    fn test_american_premium() {
        let m = market();
        let model = tree(ShortRateModel::black_karasinski(0.1, 0.2));
        let european = BondOption::european(bond(), OptionType::Put, 100.0, date(2029, 7, 2));
        let american = BondOption::american(bond(), OptionType::Put, 100.0, date(2029, 7, 2));
        let e = european.value(&m, &model).unwrap();
        let a = american.value(&m, &model).unwrap();
        assert!(a >= e - 1e-10);
        assert!(american.value(&m, &hw()).is_err());
    }

    #[test]
    fn test_embedded_options_bound_the_bullet() {
        let m = market();
        let model = tree(ShortRateModel::hull_white(0.05, 0.01));
        let bullet = bond().value(&m, &model).unwrap();
        let callable = CallableBond::new(bond())
            .with_call(date(2028, 7, 3), 100.0)
            .with_call(date(2030, 7, 2), 100.0);
        let puttable = CallableBond::new(bond()).with_put(date(2029, 7, 2), 100.0);
        assert!(callable.value(&m, &model).unwrap() < bullet);
        assert!(puttable.value(&m, &model).unwrap() > bullet);
        let plain = CallableBond::new(bond()).value(&m, &model).unwrap();
        assert_relative_eq!(plain, bullet, epsilon = 1e-10);
    }

    #[test]
    fn test_oas_round_trip() {
        let m = market();
        let short_rate = ShortRateModel::black_derman_toy(0.15);
        let callable = CallableBond::new(bond()).with_call(date(2029, 7, 2), 100.0);
        let price = callable.lattice_value(&m, &short_rate, 200, 0.015).unwrap();
        let oas = callable
            .oas(&m, &short_rate, 200, price, &SolverConfig::new(1e-10, 100))
            .unwrap();
        assert_relative_eq!(oas, 0.015, epsilon = 1e-7);
    }
}
