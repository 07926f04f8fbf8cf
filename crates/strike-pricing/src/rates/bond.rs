//! Fixed-rate bonds.
//!
//! Yield measures use street compounding at the coupon frequency with
//! times counted in coupon periods from settlement:
//!
//! ```text
//! P_dirty(y) = Σ CF_i / (1 + y/f)^(k_i + w)
//! ```
//!
//! where `w` is the unaccrued fraction of the current period and `k_i`
//! the number of whole periods to flow `i`. Curve measures discount each
//! flow on the market discount curve, optionally shifted by a Z-spread.

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::Frequency;
use strike_core::Date;
use strike_math::solvers::{newton_with_fallback, SolverConfig};

use super::{curve_flows, fit_lattice, Cashflow};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::lattice::RateLattice;
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A bullet bond paying a fixed coupon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedRateBond {
    /// Face value.
    pub face: f64,
    /// Annual coupon rate.
    pub coupon_rate: f64,
    /// Coupon frequency.
    pub frequency: Frequency,
    /// Issue (first accrual) date.
    pub issue: Date,
    /// Maturity date.
    pub maturity: Date,
    /// Coupon accrual convention.
    #[serde(default = "default_day_count")]
    pub day_count: DayCountType,
    /// Payment calendar.
    #[serde(default)]
    pub calendar: CalendarType,
    /// Payment date adjustment.
    #[serde(default)]
    pub convention: BusinessDayConvention,
}

fn default_day_count() -> DayCountType {
    DayCountType::ActActIcma
}

/// Outcome of a yield search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldResult {
    /// Yield at the coupon frequency.
    pub yield_value: f64,
    /// Solver iterations.
    pub iterations: u32,
}

/// Flows after settlement in coupon periods.
struct PeriodFlows {
    /// `(periods from settlement, amount)`.
    flows: Vec<(f64, f64)>,
    f: f64,
}

impl PeriodFlows {
    fn discount(&self, y: f64, periods: f64) -> f64 {
        (1.0 + y / self.f).powf(-periods)
    }

    fn price(&self, y: f64) -> f64 {
        self.flows.iter().map(|(n, c)| c * self.discount(y, *n)).sum()
    }

    fn derivative(&self, y: f64) -> f64 {
        self.flows
            .iter()
            .map(|(n, c)| -c * n / self.f * self.discount(y, n + 1.0))
            .sum()
    }
}

impl FixedRateBond {
    /// Bond with ACT/ACT ICMA accrual on a weekend calendar.
    pub fn new(face: f64, coupon_rate: f64, frequency: Frequency, issue: Date, maturity: Date) -> Self {
        Self {
            face,
            coupon_rate,
            frequency,
            issue,
            maturity,
            day_count: default_day_count(),
            calendar: CalendarType::Weekend,
            convention: BusinessDayConvention::default(),
        }
    }

    /// Sets the accrual day count.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountType) -> Self {
        self.day_count = day_count;
        self
    }

    fn check(&self) -> PricingResult<()> {
        require_positive("face", self.face)?;
        if !self.coupon_rate.is_finite() {
            return Err(PricingError::invalid_input("coupon rate must be finite"));
        }
        if self.frequency.is_zero() {
            return Err(PricingError::invalid_input(
                "fixed-rate bond needs a coupon frequency; use a zero coupon rate for zeros",
            ));
        }
        if self.maturity <= self.issue {
            return Err(PricingError::invalid_input(format!(
                "maturity {} is not after issue {}",
                self.maturity, self.issue
            )));
        }
        Ok(())
    }

    /// Coupon schedule rolled back from maturity.
    pub fn schedule(&self) -> PricingResult<Schedule> {
        self.check()?;
        Ok(Schedule::generate(
            self.issue,
            self.maturity,
            self.frequency,
            self.calendar,
            self.convention,
            DateGenRule::Backward,
        )?)
    }

    /// All coupon and redemption flows.
    pub fn cashflows(&self) -> PricingResult<Vec<Cashflow>> {
        let schedule = self.schedule()?;
        let alphas = schedule.year_fractions(self.day_count)?;
        let dates = schedule.payment_dates();
        let last = dates.len() - 1;
        Ok(dates
            .iter()
            .zip(alphas)
            .enumerate()
            .map(|(i, (date, alpha))| {
                let redemption = if i == last { self.face } else { 0.0 };
                Cashflow::new(*date, self.face * self.coupon_rate * alpha + redemption)
            })
            .collect())
    }

    /// Flows paid strictly after `settlement`.
    pub fn cashflows_after(&self, settlement: Date) -> PricingResult<Vec<Cashflow>> {
        Ok(self
            .cashflows()?
            .into_iter()
            .filter(|cf| cf.date > settlement)
            .collect())
    }

    /// Accrual period containing `settlement`, as `(start, end)`.
    fn current_period(&self, schedule: &Schedule, settlement: Date) -> Option<(Date, Date)> {
        schedule.periods().find(|(start, end)| *start <= settlement && settlement < *end)
    }

    /// Accrued interest at `settlement`.
    pub fn accrued(&self, settlement: Date) -> PricingResult<f64> {
        let schedule = self.schedule()?;
        match self.current_period(&schedule, settlement) {
            Some((start, end)) => {
                let alpha = self
                    .day_count
                    .year_frac(start, settlement, Some(end), Some(self.frequency))?
                    .alpha;
                Ok(self.face * self.coupon_rate * alpha)
            }
            None => Ok(0.0),
        }
    }

    fn period_flows(&self, settlement: Date) -> PricingResult<PeriodFlows> {
        let schedule = self.schedule()?;
        if settlement >= self.maturity {
            return Err(PricingError::expired("fixed-rate bond", self.maturity, settlement));
        }
        let f = f64::from(self.frequency.periods_per_year());
        let w = match self.current_period(&schedule, settlement) {
            Some((start, end)) => settlement.days_between(&end) as f64 / start.days_between(&end) as f64,
            None => 1.0,
        };
        let flows = self
            .cashflows_after(settlement)?
            .iter()
            .enumerate()
            .map(|(k, cf)| (k as f64 + w, cf.amount))
            .collect();
        Ok(PeriodFlows { flows, f })
    }

    /// Dirty price at yield `y`.
    pub fn dirty_price_from_yield(&self, settlement: Date, y: f64) -> PricingResult<f64> {
        Ok(self.period_flows(settlement)?.price(y))
    }

    /// Clean price at yield `y`.
    pub fn clean_price_from_yield(&self, settlement: Date, y: f64) -> PricingResult<f64> {
        Ok(self.dirty_price_from_yield(settlement, y)? - self.accrued(settlement)?)
    }

    /// Yield reproducing `clean_price`, by Newton with a bisection fallback.
    pub fn yield_to_maturity(
        &self,
        settlement: Date,
        clean_price: f64,
        config: &SolverConfig,
    ) -> PricingResult<YieldResult> {
        require_positive("clean price", clean_price)?;
        let flows = self.period_flows(settlement)?;
        let target = clean_price + self.accrued(settlement)?;
        let years = flows.flows.last().map_or(1.0, |(n, _)| n / flows.f);
        let guess = (self.coupon_rate * self.face + (self.face - target) / years.max(0.25)) / target;
        let lower = -0.99 * flows.f;
        let result = newton_with_fallback(
            |y| flows.price(y) - target,
            |y| flows.derivative(y),
            guess.clamp(lower * 0.5, 1.0),
            Some((lower * 0.5, 1.0)),
            config,
        )
        .map_err(|source| PricingError::SolveFailed {
            what: "yield to maturity",
            source,
        })?;
        debug!(
            yield_value = result.root,
            iterations = result.iterations,
            "yield to maturity"
        );
        Ok(YieldResult {
            yield_value: result.root,
            iterations: result.iterations,
        })
    }

    /// Macaulay duration in years at yield `y`.
    pub fn macaulay_duration(&self, settlement: Date, y: f64) -> PricingResult<f64> {
        let flows = self.period_flows(settlement)?;
        let price = flows.price(y);
        let weighted: f64 = flows
            .flows
            .iter()
            .map(|(n, c)| n / flows.f * c * flows.discount(y, *n))
            .sum();
        Ok(weighted / price)
    }

    /// Modified duration `−(1/P) dP/dy` at yield `y`.
    pub fn modified_duration(&self, settlement: Date, y: f64) -> PricingResult<f64> {
        let f = f64::from(self.frequency.periods_per_year());
        Ok(self.macaulay_duration(settlement, y)? / (1.0 + y / f))
    }

    /// Convexity `(1/P) d²P/dy²` at yield `y`.
    pub fn convexity(&self, settlement: Date, y: f64) -> PricingResult<f64> {
        let flows = self.period_flows(settlement)?;
        let f = flows.f;
        let second: f64 = flows
            .flows
            .iter()
            .map(|(n, c)| c * n * (n + 1.0) / (f * f) * flows.discount(y, n + 2.0))
            .sum();
        Ok(second / flows.price(y))
    }

    /// Dirty value of the remaining flows on the market discount curve,
    /// shifted by a continuous `z_spread`.
    pub fn curve_dirty_price(&self, market: &MarketState, z_spread: f64) -> PricingResult<f64> {
        let flows = self.cashflows_after(market.valuation_date())?;
        Ok(curve_flows(market, &flows)
            .iter()
            .map(|(t, c)| c * market.discount_at(*t) * (-z_spread * t).exp())
            .sum())
    }

    /// Clean value on the market discount curve.
    pub fn curve_clean_price(&self, market: &MarketState) -> PricingResult<f64> {
        Ok(self.curve_dirty_price(market, 0.0)? - self.accrued(market.valuation_date())?)
    }

    /// Continuous spread over the discount curve reproducing `dirty_price`.
    pub fn z_spread(&self, market: &MarketState, dirty_price: f64, config: &SolverConfig) -> PricingResult<f64> {
        require_positive("dirty price", dirty_price)?;
        let flows = curve_flows(market, &self.cashflows_after(market.valuation_date())?);
        if flows.is_empty() {
            return Err(PricingError::expired(
                "fixed-rate bond",
                self.maturity,
                market.valuation_date(),
            ));
        }
        let discounted: Vec<(f64, f64)> = flows
            .iter()
            .map(|(t, c)| (*t, c * market.discount_at(*t)))
            .collect();
        let price = |z: f64| -> f64 { discounted.iter().map(|(t, pv)| pv * (-z * t).exp()).sum() };
        let slope = |z: f64| -> f64 { discounted.iter().map(|(t, pv)| -t * pv * (-z * t).exp()).sum() };
        let result = newton_with_fallback(|z| price(z) - dirty_price, slope, 0.0, Some((-0.05, 0.2)), config)
            .map_err(|source| PricingError::SolveFailed {
                what: "Z-spread",
                source,
            })?;
        Ok(result.root)
    }

    /// Dirty value on a short-rate lattice with the market credit spread.
    pub fn lattice_value(&self, market: &MarketState, lattice: &RateLattice) -> PricingResult<f64> {
        let flows = curve_flows(market, &self.cashflows_after(market.valuation_date())?);
        Ok(roll_cashflows(lattice, &flows, market.credit_spread(), |_, _| {}))
    }
}

/// Rolls `(time, amount)` flows back through `lattice` to today.
///
/// `at_layer(i, values)` sees the values of the flows paid after layer
/// `i` and may overwrite them, e.g. to apply a call or put; flows paid
/// at layer `i` are added afterwards.
pub(crate) fn roll_cashflows(
    lattice: &RateLattice,
    flows: &[(f64, f64)],
    spread: f64,
    mut at_layer: impl FnMut(usize, &mut [f64]),
) -> f64 {
    let n = lattice.steps();
    let mut paid = vec![0.0; n + 1];
    for (t, amount) in flows {
        paid[lattice.step_of(*t)] += amount;
    }
    let mut values = vec![0.0; lattice.nodes(n)];
    for i in (0..=n).rev() {
        if i < n {
            values = lattice.step_back(i, &values, spread);
        }
        at_layer(i, &mut values);
        for v in &mut values {
            *v += paid[i];
        }
    }
    values[0]
}

/// Last flow time, the horizon of a lattice pricing these flows.
pub(crate) fn horizon(flows: &[(f64, f64)]) -> PricingResult<f64> {
    flows
        .iter()
        .map(|(t, _)| *t)
        .reduce(f64::max)
        .ok_or_else(|| PricingError::invalid_input("no cash flows after the valuation date"))
}

impl Pricer for FixedRateBond {
    fn name(&self) -> &'static str {
        "fixed-rate bond"
    }

    /// Dirty value.
    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        if self.maturity <= market.valuation_date() {
            return Err(PricingError::expired(
                self.name(),
                self.maturity,
                market.valuation_date(),
            ));
        }
        match model {
            Model::Discounting => {
                let flows = self.cashflows_after(market.valuation_date())?;
                Ok(flows.iter().map(|cf| cf.amount * market.risky_df(cf.date)).sum())
            }
            Model::ShortRateTree { model, steps } => {
                let flows = curve_flows(market, &self.cashflows_after(market.valuation_date())?);
                let lattice = fit_lattice(market, model, horizon(&flows)?, *steps)?;
                self.lattice_value(market, &lattice)
            }
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::ShortRateModel;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn bond() -> FixedRateBond {
        FixedRateBond::new(100.0, 0.05, Frequency::SemiAnnual, date(2025, 1, 15), date(2030, 1, 15))
            .with_day_count(DayCountType::ActActIcma)
    }

    fn config() -> SolverConfig {
        SolverConfig::new(1e-12, 100)
    }

    fn market(rate: f64) -> MarketState {
        let today = date(2025, 3, 3);
        MarketState::new(today, Arc::new(FlatCurve::continuous(today, rate)))
    }

    #[test]
    fn test_cashflows() {
        let flows = bond().cashflows().unwrap();
        assert_eq!(flows.len(), 10);
        assert_relative_eq!(flows[0].amount, 2.5, epsilon = 1e-12);
        assert_relative_eq!(flows[9].amount, 102.5, epsilon = 1e-12);
        // 2025-07-15 is a Tuesday, 2028-01-15 a Saturday.
        assert_eq!(flows[0].date, date(2025, 7, 15));
        assert_eq!(flows[5].date, date(2028, 1, 17));
    }

    #[test]
    fn test_par_yield_on_coupon_date() {
        let b = bond();
        let settle = date(2025, 1, 15);
        assert_relative_eq!(b.accrued(settle).unwrap(), 0.0);
        assert_relative_eq!(b.clean_price_from_yield(settle, 0.05).unwrap(), 100.0, epsilon = 1e-9);
        let ytm = b.yield_to_maturity(settle, 100.0, &config()).unwrap();
        assert_relative_eq!(ytm.yield_value, 0.05, epsilon = 1e-10);
    }

    #[test]
    fn test_yield_round_trip_between_coupons() {
        let b = bond();
        let settle = date(2026, 4, 20);
        assert!(b.accrued(settle).unwrap() > 0.0);
        for y in [0.01, 0.045, 0.09] {
            let clean = b.clean_price_from_yield(settle, y).unwrap();
            let ytm = b.yield_to_maturity(settle, clean, &config()).unwrap();
            assert_relative_eq!(ytm.yield_value, y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_duration_matches_finite_difference() {
        let b = bond();
        let settle = date(2026, 4, 20);
        let y = 0.04;
        let h = 1e-5;
        let p = b.dirty_price_from_yield(settle, y).unwrap();
        let up = b.dirty_price_from_yield(settle, y + h).unwrap();
        let down = b.dirty_price_from_yield(settle, y - h).unwrap();
        let modified = b.modified_duration(settle, y).unwrap();
        assert_relative_eq!(modified, -(up - down) / (2.0 * h * p), max_relative = 1e-6);
        let convexity = b.convexity(settle, y).unwrap();
        assert_relative_eq!(convexity, (up - 2.0 * p + down) / (h * h * p), max_relative = 1e-4);
        assert!(b.macaulay_duration(settle, y).unwrap() > modified);
    }

    #[test]
    fn test_z_spread_round_trip() {
        let m = market(0.03);
        let b = bond();
        let target = b.curve_dirty_price(&m, 0.0125).unwrap();
        let z = b.z_spread(&m, target, &config()).unwrap();
        assert_relative_eq!(z, 0.0125, epsilon = 1e-9);
    }

    #[test]
    fn test_discounting_and_tree_agree() {
        let m = market(0.04);
        let b = bond();
        let discounted = b.value(&m, &Model::Discounting).unwrap();
        assert_relative_eq!(discounted, b.curve_dirty_price(&m, 0.0).unwrap(), epsilon = 1e-10);
        let tree = b
            .value(
                &m,
                &Model::ShortRateTree {
                    model: ShortRateModel::hull_white(0.1, 0.01),
                    steps: 240,
                },
            )
            .unwrap();
        assert_relative_eq!(tree, discounted, max_relative = 1e-3);
    }

    #[test]
    fn test_matured_bond_is_rejected() {
        let m = market(0.04);
        let old = FixedRateBond::new(100.0, 0.05, Frequency::Annual, date(2020, 1, 1), date(2024, 1, 1));
        let err = old.value(&m, &Model::Discounting).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::Domain);
    }
}
