//! Floating-rate notes.

use serde::{Deserialize, Serialize};

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::Frequency;
use strike_core::Date;
use strike_math::solvers::{newton_with_fallback, SolverConfig};

use super::{curve_flows, Cashflow};
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// A note paying the index rate plus a quoted margin each period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatingRateNote {
    /// Face value.
    pub face: f64,
    /// Quoted margin over the index.
    #[serde(default)]
    pub margin: f64,
    /// Reset and payment frequency.
    pub frequency: Frequency,
    /// Issue (first accrual) date.
    pub issue: Date,
    /// Maturity date.
    pub maturity: Date,
    /// Accrual convention of the index and coupons.
    #[serde(default = "default_day_count")]
    pub day_count: DayCountType,
    /// Payment calendar.
    #[serde(default)]
    pub calendar: CalendarType,
    /// Index fixing of the current period when it started before valuation.
    #[serde(default)]
    pub current_fixing: Option<f64>,
}

fn default_day_count() -> DayCountType {
    DayCountType::Act360
}

impl FloatingRateNote {
    /// FRN with ACT/360 accrual on a weekend calendar.
    pub fn new(face: f64, margin: f64, frequency: Frequency, issue: Date, maturity: Date) -> Self {
        Self {
            face,
            margin,
            frequency,
            issue,
            maturity,
            day_count: default_day_count(),
            calendar: CalendarType::Weekend,
            current_fixing: None,
        }
    }

    /// Sets the fixing of the period running at valuation.
    #[must_use]
    pub fn with_current_fixing(mut self, fixing: f64) -> Self {
        self.current_fixing = Some(fixing);
        self
    }

    /// Reset schedule.
    pub fn schedule(&self) -> PricingResult<Schedule> {
        require_positive("face", self.face)?;
        if self.frequency.is_zero() || self.maturity <= self.issue {
            return Err(PricingError::invalid_input(
                "FRN needs a reset frequency and maturity after issue",
            ));
        }
        Ok(Schedule::generate(
            self.issue,
            self.maturity,
            self.frequency,
            self.calendar,
            BusinessDayConvention::ModifiedFollowing,
            DateGenRule::Backward,
        )?)
    }

    /// Coupons paid after valuation, projected on the forecast curve, plus
    /// the redemption.
    pub fn projected_cashflows(&self, market: &MarketState) -> PricingResult<Vec<Cashflow>> {
        let valuation = market.valuation_date();
        if self.maturity <= valuation {
            return Err(PricingError::expired("FRN", self.maturity, valuation));
        }
        let schedule = self.schedule()?;
        let mut flows = Vec::new();
        for (start, end) in schedule.periods().filter(|(_, end)| *end > valuation) {
            let alpha = self
                .day_count
                .year_frac(start, end, Some(end), Some(self.frequency))?
                .alpha;
            let index = if start < valuation {
                self.current_fixing
                    .ok_or_else(|| PricingError::missing(format!("FRN fixing for the period starting {start}")))?
            } else {
                market.forward_rate(start, end, self.day_count)?
            };
            flows.push(Cashflow::new(end, self.face * (index + self.margin) * alpha));
        }
        if let Some(last) = flows.last_mut() {
            last.amount += self.face;
        }
        Ok(flows)
    }

    /// Continuous spread over the discount curve reproducing `dirty_price`.
    pub fn discount_margin(&self, market: &MarketState, dirty_price: f64, config: &SolverConfig) -> PricingResult<f64> {
        require_positive("dirty price", dirty_price)?;
        let discounted: Vec<(f64, f64)> = curve_flows(market, &self.projected_cashflows(market)?)
            .into_iter()
            .map(|(t, c)| (t, c * market.discount_at(t)))
            .collect();
        let price = |s: f64| -> f64 { discounted.iter().map(|(t, pv)| pv * (-s * t).exp()).sum() };
        let slope = |s: f64| -> f64 { discounted.iter().map(|(t, pv)| -t * pv * (-s * t).exp()).sum() };
        newton_with_fallback(|s| price(s) - dirty_price, slope, 0.0, Some((-0.05, 0.2)), config)
            .map(|r| r.root)
            .map_err(|source| PricingError::SolveFailed {
                what: "discount margin",
                source,
            })
    }
}

impl Pricer for FloatingRateNote {
    fn name(&self) -> &'static str {
        "floating-rate note"
    }

    /// Dirty value.
    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        match model {
            Model::Discounting => Ok(self
                .projected_cashflows(market)?
                .iter()
                .map(|cf| cf.amount * market.risky_df(cf.date))
                .sum()),
            _ => Err(self.mismatch(model)),
        }
    }
}
