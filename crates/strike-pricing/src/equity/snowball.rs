//! Snowball autocallables on a weighted basket.
//!
//! The basket `B = Σ w_i S_i` is simulated on every business day up to
//! maturity. On the first business day of each month after valuation the
//! trade knocks out if `B ≥ KO` (call style) or `B ≤ KO` (put style) and
//! pays the coupon accrued to the next coupon boundary. A basket that
//! crosses the knock-in level on any business day and never knocks out
//! pays the [`KnockInPayoff`] at maturity. Otherwise the full coupon is
//! paid at maturity. Principal is not included.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tracing::debug;

use strike_core::calendars::{BusinessDayConvention, Calendar, CalendarType};
use strike_core::types::{Frequency, OptionType, ProductType};
use strike_core::Date;
use strike_mc::{CorrelatedGbm, McConfig, McEstimate, PathPayoff};

use super::{alive, estimate};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// What a knocked-in snowball pays at maturity, as a fraction of notional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KnockInPayoff {
    /// `min(φ(B_T/B_0 − 1), 0)`.
    #[default]
    Return,
    /// Short vanilla on the basket: `−max(φ(K − B_T), 0) / B_0`.
    Vanilla {
        /// Strike in basket units.
        strike: f64,
    },
    /// Short spread capping the loss at `(upper − lower) / B_0`.
    Spread {
        /// Lower basket level.
        lower: f64,
        /// Upper basket level.
        upper: f64,
    },
}

impl KnockInPayoff {
    fn value(&self, option_type: OptionType, basket: f64, initial: f64) -> f64 {
        let phi = option_type.phi();
        match *self {
            KnockInPayoff::Return => (phi * (basket / initial - 1.0)).min(0.0),
            KnockInPayoff::Vanilla { strike } => -(phi * (strike - basket)).max(0.0) / initial,
            KnockInPayoff::Spread { lower, upper } => {
                let width = upper - lower;
                let depth = match option_type {
                    OptionType::Call => upper - basket,
                    OptionType::Put => basket - lower,
                };
                -depth.clamp(0.0, width) / initial
            }
        }
    }
}

/// A snowball on the weighted basket of the market's assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snowball {
    /// `Call` knocks out upwards and in downwards, `Put` the reverse.
    pub option_type: OptionType,
    /// Notional.
    pub notional: f64,
    /// Knock-out level in basket units.
    pub knock_out: f64,
    /// Knock-in level in basket units.
    pub knock_in: f64,
    /// Annualised coupon rate.
    pub coupon: f64,
    /// Accrual boundary of the knock-out coupon.
    #[serde(default)]
    pub coupon_frequency: Frequency,
    /// Maturity date.
    pub maturity: Date,
    /// Weight of each market asset, in market order.
    pub weights: Vec<f64>,
    /// Calendar of the observation dates.
    #[serde(default)]
    pub calendar: CalendarType,
    /// Payoff after a knock-in.
    #[serde(default)]
    pub knock_in_payoff: KnockInPayoff,
}

impl Snowball {
    /// Creates a snowball with annual coupon accrual on a weekend calendar.
    pub fn new(
        option_type: OptionType,
        notional: f64,
        knock_out: f64,
        knock_in: f64,
        coupon: f64,
        maturity: Date,
        weights: Vec<f64>,
    ) -> Self {
        Self {
            option_type,
            notional,
            knock_out,
            knock_in,
            coupon,
            coupon_frequency: Frequency::Annual,
            maturity,
            weights,
            calendar: CalendarType::Weekend,
            knock_in_payoff: KnockInPayoff::Return,
        }
    }

    /// Snowball from a boundary product type.
    pub fn from_product(
        product: ProductType,
        notional: f64,
        knock_out: f64,
        knock_in: f64,
        coupon: f64,
        maturity: Date,
        weights: Vec<f64>,
    ) -> PricingResult<Self> {
        match product {
            ProductType::SnowballCall | ProductType::SnowballPut => Ok(Self::new(
                product.option_type(),
                notional,
                knock_out,
                knock_in,
                coupon,
                maturity,
                weights,
            )),
            other => Err(PricingError::invalid_input(format!("{other:?} is not a snowball"))),
        }
    }

    /// Sets the knock-in payoff.
    #[must_use]
    pub fn with_knock_in_payoff(mut self, payoff: KnockInPayoff) -> Self {
        self.knock_in_payoff = payoff;
        self
    }

    /// Sets the coupon accrual frequency.
    #[must_use]
    pub fn with_coupon_frequency(mut self, frequency: Frequency) -> Self {
        self.coupon_frequency = frequency;
        self
    }

    /// Sets the observation calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: CalendarType) -> Self {
        self.calendar = calendar;
        self
    }

    fn check(&self) -> PricingResult<()> {
        require_positive("notional", self.notional)?;
        require_positive("knock-out level", self.knock_out)?;
        require_positive("knock-in level", self.knock_in)?;
        if self.weights.is_empty() {
            return Err(PricingError::invalid_input("snowball basket has no assets"));
        }
        if self.weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(PricingError::invalid_input("snowball weights must be non-negative"));
        }
        if !self.coupon.is_finite() {
            return Err(PricingError::invalid_input("coupon must be finite"));
        }
        if self.coupon_frequency.is_zero() {
            return Err(PricingError::invalid_input("coupon frequency cannot be zero"));
        }
        if let KnockInPayoff::Spread { lower, upper } = self.knock_in_payoff {
            if !(lower < upper) {
                return Err(PricingError::invalid_input(format!(
                    "spread needs lower < upper, got {lower} and {upper}"
                )));
            }
        }
        Ok(())
    }

    /// Knock-out observation dates: the first business day of each month
    /// after valuation, up to maturity.
    pub fn knock_out_dates(&self, valuation: Date) -> PricingResult<Vec<Date>> {
        let calendar = self.calendar.calendar();
        let first = valuation.start_of_month();
        let mut dates = Vec::new();
        for m in 1.. {
            let date = calendar.adjust(first.add_months(m)?, BusinessDayConvention::Following);
            if date > self.maturity {
                break;
            }
            dates.push(date);
        }
        Ok(dates)
    }

    /// Coupon accrued to the coupon boundary at or after `t`, capped at
    /// maturity, as a fraction of notional.
    fn accrued_coupon(&self, t: f64, maturity: f64) -> f64 {
        let f = f64::from(self.coupon_frequency.periods_per_year());
        let periods = (t * f - 1e-10).ceil().max(1.0);
        self.coupon * (periods / f).min(maturity)
    }

    fn path_payoff(&self, market: &MarketState) -> PricingResult<(SnowballPath, Vec<f64>)> {
        let valuation = market.valuation_date();
        let maturity = alive(market, self.maturity, self.name())?;
        let mut days = self.calendar.calendar().business_days(valuation.add_days(1), self.maturity);
        if days.last() != Some(&self.maturity) {
            days.push(self.maturity);
        }
        let ko_dates = self.knock_out_dates(valuation)?;
        let times: Vec<f64> = days.iter().map(|d| market.time_to(*d)).collect();
        let knock_out_values = days
            .iter()
            .zip(&times)
            .map(|(d, t)| {
                ko_dates
                    .contains(d)
                    .then(|| self.notional * self.accrued_coupon(*t, maturity) * market.df(*d))
            })
            .collect();
        let initial = (0..self.weights.len())
            .map(|i| market.spot(i).map(|s| s * self.weights[i]))
            .sum::<PricingResult<f64>>()?;
        debug!(
            observations = days.len(),
            knock_out_dates = ko_dates.len(),
            initial,
            "snowball observation grid"
        );
        let path = SnowballPath {
            phi: self.option_type.phi(),
            option_type: self.option_type,
            weights: self.weights.clone(),
            initial,
            knock_out: self.knock_out,
            knock_in: self.knock_in,
            knock_out_values,
            knock_in_payoff: self.knock_in_payoff,
            notional: self.notional,
            maturity_df: market.df(self.maturity),
            full_coupon: self.coupon * maturity,
        };
        Ok((path, times))
    }

    /// Monte Carlo estimate of the snowball value.
    pub fn value_mc(&self, market: &MarketState, config: &McConfig) -> PricingResult<McEstimate> {
        self.check()?;
        let (payoff, times) = self.path_payoff(market)?;
        let n = self.weights.len();
        let mut spots = Vec::with_capacity(n);
        let mut drifts = Vec::with_capacity(n);
        let mut vols = Vec::with_capacity(n);
        let r = market.rate_to(self.maturity);
        for i in 0..n {
            let spot = market.spot(i)?;
            spots.push(spot);
            drifts.push(r - market.carry_to(i, self.maturity)?);
            vols.push(market.vol(i, spot, self.maturity)?);
        }
        let gbm = CorrelatedGbm::new(spots, drifts, vols, &market.correlation(n)?)?;
        let samples = gbm.evaluate_on_grid(&times, config, &payoff)?;
        Ok(estimate(&samples, config))
    }
}

/// Discounted path payoff on the business-day grid.
struct SnowballPath {
    phi: f64,
    option_type: OptionType,
    weights: Vec<f64>,
    initial: f64,
    knock_out: f64,
    knock_in: f64,
    /// Discounted knock-out payment per grid step, `None` off observation dates.
    knock_out_values: Vec<Option<f64>>,
    knock_in_payoff: KnockInPayoff,
    notional: f64,
    maturity_df: f64,
    full_coupon: f64,
}

impl SnowballPath {
    fn basket(&self, prices: &[f64]) -> f64 {
        self.weights.iter().zip(prices).map(|(w, s)| w * s).sum()
    }
}

impl PathPayoff for SnowballPath {
    /// Knocked in.
    type State = bool;

    fn start(&self) -> Self::State {
        false
    }

    fn observe(&self, knocked_in: &mut Self::State, step: usize, prices: &[f64]) -> ControlFlow<f64> {
        let basket = self.basket(prices);
        if let Some(Some(value)) = self.knock_out_values.get(step - 1) {
            if self.phi * (basket - self.knock_out) >= 0.0 {
                return ControlFlow::Break(*value);
            }
        }
        if self.phi * (self.knock_in - basket) >= 0.0 {
            *knocked_in = true;
        }
        ControlFlow::Continue(())
    }

    fn finish(&self, knocked_in: Self::State, prices: &[f64]) -> f64 {
        let payoff = if knocked_in {
            self.knock_in_payoff
                .value(self.option_type, self.basket(prices), self.initial)
        } else {
            self.full_coupon
        };
        self.notional * payoff * self.maturity_df
    }
}

impl Pricer for Snowball {
    fn name(&self) -> &'static str {
        match self.option_type {
            OptionType::Call => "snowball call",
            OptionType::Put => "snowball put",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::MonteCarlo(config) => Ok(self.value_mc(market, config)?.value),
            _ => Err(self.mismatch(model)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strike_curves::curves::FlatCurve;
    use strike_math::linear_algebra::constant_correlation;

    fn today() -> Date {
        Date::from_ymd(2025, 1, 2).unwrap()
    }

    fn market(n: usize, vol: f64) -> MarketState {
        let mut m = MarketState::new(today(), Arc::new(FlatCurve::continuous(today(), 0.05)));
        for _ in 0..n {
            m = m.add_flat_vol_asset(100.0, 0.01, vol).unwrap();
        }
        m.with_correlation(constant_correlation(n, 0.0).unwrap()).unwrap()
    }

    fn maturity() -> Date {
        Date::from_ymd(2026, 1, 2).unwrap()
    }

    #[test]
    fn test_knock_out_dates() {
        let snowball = Snowball::new(OptionType::Call, 1.0, 110.0, 80.0, 0.2, maturity(), vec![1.0]);
        let dates = snowball.knock_out_dates(today()).unwrap();
        assert_eq!(dates.len(), 12);
        // 2025-02-01 is a Saturday.
        assert_eq!(dates[0], Date::from_ymd(2025, 2, 3).unwrap());
        assert_eq!(dates[11], Date::from_ymd(2026, 1, 1).unwrap());
        assert!(dates.iter().all(|d| !d.is_weekend()));
    }

    #[test]
    fn test_accrued_coupon_rounds_up_to_boundary() {
        let snowball = Snowball::new(OptionType::Call, 1.0, 110.0, 80.0, 0.2, maturity(), vec![1.0]);
        assert_relative_eq!(snowball.accrued_coupon(0.1, 1.0), 0.2);
        let quarterly = snowball.clone().with_coupon_frequency(Frequency::Quarterly);
        assert_relative_eq!(quarterly.accrued_coupon(0.1, 1.0), 0.05);
        assert_relative_eq!(quarterly.accrued_coupon(0.3, 1.0), 0.1);
        let short = Snowball {
            maturity: today().add_days(100),
            ..snowball
        };
        assert_relative_eq!(short.accrued_coupon(0.2, 0.27), 0.2 * 0.27);
    }

    #[test]
    fn test_knock_in_payoffs() {
        let ret = KnockInPayoff::Return;
        assert_relative_eq!(ret.value(OptionType::Call, 80.0, 100.0), -0.2);
        assert_relative_eq!(ret.value(OptionType::Call, 120.0, 100.0), 0.0);
        assert_relative_eq!(ret.value(OptionType::Put, 120.0, 100.0), -0.2);

        let vanilla = KnockInPayoff::Vanilla { strike: 90.0 };
        assert_relative_eq!(vanilla.value(OptionType::Call, 80.0, 100.0), -0.1);
        assert_relative_eq!(vanilla.value(OptionType::Call, 95.0, 100.0), 0.0);

        let spread = KnockInPayoff::Spread {
            lower: 80.0,
            upper: 100.0,
        };
        assert_relative_eq!(spread.value(OptionType::Call, 50.0, 100.0), -0.2);
        assert_relative_eq!(spread.value(OptionType::Call, 90.0, 100.0), -0.1);
        assert_relative_eq!(spread.value(OptionType::Put, 90.0, 100.0), -0.1);
    }

    #[test]
    fn test_zero_vol_pays_full_coupon() {
        let m = market(2, 1e-8);
        let snowball = Snowball::new(OptionType::Call, 1e6, 200.0, 50.0, 0.1, maturity(), vec![0.5, 0.5]);
        let est = snowball.value_mc(&m, &McConfig::new(200, 1, 3)).unwrap();
        let expected = 1e6 * 0.1 * m.time_to(maturity()) * m.df(maturity());
        assert_relative_eq!(est.value, expected, max_relative = 1e-8);
    }

    #[test]
    fn test_put_style_knocks_out_at_first_observation() {
        let m = market(2, 0.2);
        let snowball = Snowball::new(OptionType::Put, 1e6, 150.0, 60.0, 0.2, maturity(), vec![0.5, 0.5]);
        let est = snowball.value_mc(&m, &McConfig::new(500, 1, 9)).unwrap();
        let first = Date::from_ymd(2025, 2, 3).unwrap();
        assert_relative_eq!(est.value, 1e6 * 0.2 * m.df(first), max_relative = 1e-10);
    }

    #[test]
    fn test_knock_in_lowers_value() {
        let m = market(3, 0.3);
        let config = McConfig::new(4_000, 1, 17);
        let base = Snowball::new(OptionType::Call, 1.0, 110.0, 40.0, 0.15, maturity(), vec![1.0 / 3.0; 3]);
        let risky = Snowball {
            knock_in: 90.0,
            ..base.clone()
        };
        let safe = base.value_mc(&m, &config).unwrap().value;
        let exposed = risky.value_mc(&m, &config).unwrap().value;
        assert!(exposed < safe, "{exposed} vs {safe}");
    }

    #[test]
    fn test_rejects_analytic() {
        let snowball = Snowball::new(OptionType::Call, 1.0, 110.0, 80.0, 0.2, maturity(), vec![1.0]);
        let err = snowball.value(&market(1, 0.2), &Model::Analytic).unwrap_err();
        assert_eq!(err.kind(), strike_core::ErrorKind::ModelMismatch);
    }
}
