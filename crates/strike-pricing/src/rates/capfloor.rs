//! Caps and floors as strips of caplets and floorlets.
//!
//! Each period fixing after valuation is an option on its simple forward
//! rate expiring at the period start and paid at the period end, valued
//! with [`forward_option`](super::forward_option).

use serde::{Deserialize, Serialize};

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::{Frequency, OptionType};
use strike_core::Date;

use super::forward_option;
use crate::error::{require_positive, PricingError, PricingResult};
use crate::market::MarketState;
use crate::model::Model;
use crate::pricer::Pricer;

/// Cap or floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapFloorType {
    /// Calls on the rate.
    Cap,
    /// Puts on the rate.
    Floor,
}

impl CapFloorType {
    /// Option type of each period.
    pub fn option_type(&self) -> OptionType {
        match self {
            CapFloorType::Cap => OptionType::Call,
            CapFloorType::Floor => OptionType::Put,
        }
    }
}

/// An interest rate cap or floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapFloor {
    /// Cap or floor.
    pub cap_type: CapFloorType,
    /// Notional.
    pub notional: f64,
    /// Strike rate.
    pub strike: f64,
    /// First accrual date.
    pub effective: Date,
    /// Last payment date.
    pub maturity: Date,
    /// Reset frequency.
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    /// Accrual convention.
    #[serde(default = "default_day_count")]
    pub day_count: DayCountType,
    /// Payment calendar.
    #[serde(default)]
    pub calendar: CalendarType,
    /// Index fixing of the period running at valuation.
    #[serde(default)]
    pub current_fixing: Option<f64>,
}

fn default_frequency() -> Frequency {
    Frequency::Quarterly
}

fn default_day_count() -> DayCountType {
    DayCountType::Act360
}

impl CapFloor {
    /// Quarterly ACT/360 cap.
    pub fn cap(notional: f64, strike: f64, effective: Date, maturity: Date) -> Self {
        Self {
            cap_type: CapFloorType::Cap,
            notional,
            strike,
            effective,
            maturity,
            frequency: default_frequency(),
            day_count: default_day_count(),
            calendar: CalendarType::Weekend,
            current_fixing: None,
        }
    }

    /// Quarterly ACT/360 floor.
    pub fn floor(notional: f64, strike: f64, effective: Date, maturity: Date) -> Self {
        Self {
            cap_type: CapFloorType::Floor,
            ..Self::cap(notional, strike, effective, maturity)
        }
    }

    /// Reset schedule.
    pub fn schedule(&self) -> PricingResult<Schedule> {
        require_positive("notional", self.notional)?;
        if self.frequency.is_zero() || self.maturity <= self.effective {
            return Err(PricingError::invalid_input(
                "cap/floor needs a reset frequency and maturity after the effective date",
            ));
        }
        Ok(Schedule::generate(
            self.effective,
            self.maturity,
            self.frequency,
            self.calendar,
            BusinessDayConvention::ModifiedFollowing,
            DateGenRule::Backward,
        )?)
    }

    /// Value of each period still to pay, in schedule order.
    pub fn period_values(&self, market: &MarketState, model: &Model) -> PricingResult<Vec<f64>> {
        let valuation = market.valuation_date();
        if self.maturity <= valuation {
            return Err(PricingError::expired(self.name(), self.maturity, valuation));
        }
        let option_type = self.cap_type.option_type();
        let schedule = self.schedule()?;
        schedule
            .periods()
            .filter(|(_, end)| *end > valuation)
            .map(|(start, end)| {
                let alpha = self.day_count.year_fraction(start, end)?;
                let df = market.df(end);
                let unit = if start <= valuation {
                    let fixing = self.current_fixing.ok_or_else(|| {
                        PricingError::missing(format!("fixing for the period starting {start}"))
                    })?;
                    df * option_type.payoff(fixing, self.strike)
                } else {
                    let forward = market.forward_rate(start, end, self.day_count)?;
                    forward_option(market, model, self.name(), forward, self.strike, start, df, option_type)?
                };
                Ok(self.notional * alpha * unit)
            })
            .collect()
    }
}

impl Pricer for CapFloor {
    fn name(&self) -> &'static str {
        match self.cap_type {
            CapFloorType::Cap => "cap",
            CapFloorType::Floor => "floor",
        }
    }

    fn value(&self, market: &MarketState, model: &Model) -> PricingResult<f64> {
        Ok(self.period_values(market, model)?.iter().sum())
    }
}
