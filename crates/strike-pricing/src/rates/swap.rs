//! Fixed-for-floating interest rate swaps.
//!
//! The floating leg is projected on the forecast curve and both legs are
//! discounted on the discount curve. Values are to the holder of the
//! [`SwapType`]: a payer swap is worth `float − fixed`.

use serde::{Deserialize, Serialize};

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::{Frequency, SwapType};
use strike_core::Date;

use super::Cashflow;
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A vanilla fixed-for-floating swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestRateSwap {
    /// Direction of the fixed leg.
    pub swap_type: SwapType,
    /// Notional of both legs.
    pub notional: f64,
    /// Fixed coupon rate.
    pub fixed_rate: f64,
    /// First accrual date.
    pub effective: Date,
    /// Last payment date.
    pub maturity: Date,
    /// Fixed leg frequency.
    #[serde(default)]
    pub fixed_frequency: Frequency,
    /// Fixed leg accrual.
    #[serde(default = "default_fixed_day_count")]
    pub fixed_day_count: DayCountType,
    /// Floating leg frequency.
    #[serde(default = "default_float_frequency")]
    pub float_frequency: Frequency,
    /// Floating leg accrual.
    #[serde(default = "default_float_day_count")]
    pub float_day_count: DayCountType,
    /// Margin on the floating leg.
    #[serde(default)]
    pub float_spread: f64,
    /// Payment calendar of both legs.
    #[serde(default)]
    pub calendar: CalendarType,
    /// Index fixing of the floating period running at valuation.
    #[serde(default)]
    pub current_fixing: Option<f64>,
}

fn default_fixed_day_count() -> DayCountType {
    DayCountType::Thirty360Bond
}

fn default_float_frequency() -> Frequency {
    Frequency::Quarterly
}

fn default_float_day_count() -> DayCountType {
    DayCountType::Act360
}

impl InterestRateSwap {
    /// Annual 30/360 fixed against quarterly ACT/360 floating.
    pub fn new(swap_type: SwapType, notional: f64, fixed_rate: f64, effective: Date, maturity: Date) -> Self {
        Self {
            swap_type,
            notional,
            fixed_rate,
            effective,
            maturity,
            fixed_frequency: Frequency::Annual,
            fixed_day_count: default_fixed_day_count(),
            float_frequency: default_float_frequency(),
            float_day_count: default_float_day_count(),
            float_spread: 0.0,
            calendar: CalendarType::Weekend,
            current_fixing: None,
        }
    }

    /// Sets the fixed leg frequency and day count.
    #[must_use]
    pub fn with_fixed_leg(mut self, frequency: Frequency, day_count: DayCountType) -> Self {
        self.fixed_frequency = frequency;
        self.fixed_day_count = day_count;
        self
    }

    /// Sets the floating leg frequency and day count.
    #[must_use]
    pub fn with_float_leg(mut self, frequency: Frequency, day_count: DayCountType) -> Self {
        self.float_frequency = frequency;
        self.float_day_count = day_count;
        self
    }

    fn leg_schedule(&self, frequency: Frequency) -> PricingResult<Schedule> {
        require_positive("swap notional", self.notional)?;
        if frequency.is_zero() || self.maturity <= self.effective {
            return Err(PricingError::invalid_input(
                "swap legs need a frequency and maturity after the effective date",
            ));
        }
        Ok(Schedule::generate(
            self.effective,
            self.maturity,
            frequency,
            self.calendar,
            BusinessDayConvention::ModifiedFollowing,
            DateGenRule::Backward,
        )?)
    }

    /// Fixed leg schedule.
    pub fn fixed_schedule(&self) -> PricingResult<Schedule> {
        self.leg_schedule(self.fixed_frequency)
    }

    /// Floating leg schedule.
    pub fn float_schedule(&self) -> PricingResult<Schedule> {
        self.leg_schedule(self.float_frequency)
    }

    /// Fixed periods as `(accrual start, payment date, accrual fraction)`.
    pub fn fixed_periods(&self) -> PricingResult<Vec<(Date, Date, f64)>> {
        let schedule = self.fixed_schedule()?;
        let alphas = schedule.year_fractions(self.fixed_day_count)?;
        Ok(schedule
            .periods()
            .zip(alphas)
            .map(|((start, end), alpha)| (start, end, alpha))
            .collect())
    }

    /// Fixed coupons per unit notional at `rate`, plus the notional at
    /// maturity, for periods starting on or after `from`.
    pub fn fixed_bond_flows(&self, rate: f64, from: Date) -> PricingResult<Vec<Cashflow>> {
        let mut flows: Vec<Cashflow> = self
            .fixed_periods()?
            .into_iter()
            .filter(|(start, _, _)| *start >= from)
            .map(|(_, pay, alpha)| Cashflow::new(pay, rate * alpha))
            .collect();
        if let Some(last) = flows.last_mut() {
            last.amount += 1.0;
        }
        Ok(flows)
    }

    /// `Σ α_i df(pay_i)` over fixed periods paid after valuation, per unit
    /// notional.
    pub fn annuity(&self, market: &MarketState) -> PricingResult<f64> {
        let valuation = market.valuation_date();
        Ok(self
            .fixed_periods()?
            .iter()
            .filter(|(_, pay, _)| *pay > valuation)
            .map(|(_, pay, alpha)| alpha * market.df(*pay))
            .sum())
    }

    /// Present value of the fixed leg.
    pub fn fixed_leg_value(&self, market: &MarketState) -> PricingResult<f64> {
        Ok(self.notional * self.fixed_rate * self.annuity(market)?)
    }

    /// Present value of the floating leg including its margin.
    pub fn float_leg_value(&self, market: &MarketState) -> PricingResult<f64> {
        let valuation = market.valuation_date();
        let schedule = self.float_schedule()?;
        let mut pv = 0.0;
        for (start, end) in schedule.periods().filter(|(_, end)| *end > valuation) {
            let alpha = self.float_day_count.year_fraction(start, end)?;
            let index = if start < valuation {
                self.current_fixing.ok_or_else(|| {
                    PricingError::missing(format!("swap fixing for the period starting {start}"))
                })?
            } else {
                market.forward_rate(start, end, self.float_day_count)?
            };
            pv += (index + self.float_spread) * alpha * market.df(end);
        }
        Ok(self.notional * pv)
    }

    /// Fixed rate that sets the swap value to zero.
    pub fn par_rate(&self, market: &MarketState) -> PricingResult<f64> {
        let annuity = self.annuity(market)?;
        if annuity <= 0.0 {
            return Err(PricingError::invalid_input("swap has no fixed payments left"));
        }
        Ok(self.float_leg_value(market)? / (self.notional * annuity))
    }

    /// Value change for a one basis point rise in the fixed rate, to the
    /// fixed-rate receiver.
    pub fn pv01(&self, market: &MarketState) -> PricingResult<f64> {
        Ok(self.notional * self.annuity(market)? * 1e-4)
    }

    /// Value to the holder.
    pub fn npv(&self, market: &MarketState) -> PricingResult<f64> {
        if self.maturity <= market.valuation_date() {
            return Err(PricingError::expired(self.name(), self.maturity, market.valuation_date()));
        }
        Ok(self.swap_type.sign() * (self.float_leg_value(market)? - self.fixed_leg_value(market)?))
    }
}

impl Pricer for InterestRateSwap {
    fn name(&self) -> &'static str {
        match self.swap_type {
            SwapType::Pay => "payer swap",
            SwapType::Receive => "receiver swap",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Discounting => self.npv(market),
            _ => Err(self.mismatch(model)),
        }
    }
}
