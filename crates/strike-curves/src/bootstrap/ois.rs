//! OIS discount curve bootstrap.

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::DayCountType;
use strike_core::types::Frequency;
use strike_core::Date;

use super::engine::{bootstrap, BootstrapConfig};
use super::instruments::{CalibrationInstrument, Swap};
use super::repricing::BootstrapResult;
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationType;

/// Builds a discount curve from overnight index swap quotes.
///
/// Each quote becomes a swap whose compounded overnight leg is worth
/// `df(effective) - df(maturity)`, against an ACT/360 fixed leg paid
/// annually, or once at maturity for swaps up to one year.
#[derive(Debug, Clone)]
pub struct OisBootstrapper {
    valuation_date: Date,
    effective_date: Date,
    calendar: CalendarType,
    fixed_day_count: DayCountType,
    quotes: Vec<(Date, f64)>,
    config: BootstrapConfig,
}

impl OisBootstrapper {
    /// Creates a bootstrapper whose swaps start on the valuation date.
    #[must_use]
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            effective_date: valuation_date,
            calendar: CalendarType::Weekend,
            fixed_day_count: DayCountType::Act360,
            quotes: Vec::new(),
            config: BootstrapConfig::default(),
        }
    }

    /// Sets the common effective (spot) date of the swaps.
    #[must_use]
    pub fn with_effective_date(mut self, effective_date: Date) -> Self {
        self.effective_date = effective_date;
        self
    }

    /// Sets the payment calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: CalendarType) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the fixed leg day count.
    #[must_use]
    pub fn with_fixed_day_count(mut self, day_count: DayCountType) -> Self {
        self.fixed_day_count = day_count;
        self
    }

    /// Adds a quote maturing on `maturity`.
    #[must_use]
    pub fn with_quote(mut self, maturity: Date, rate: f64) -> Self {
        self.quotes.push((maturity, rate));
        self
    }

    /// Adds a quote for a tenor such as `"6M"` or `"5Y"` from the
    /// effective date.
    pub fn with_tenor_quote(self, tenor: &str, rate: f64) -> CurveResult<Self> {
        let maturity = self.effective_date.add_tenor_str(tenor)?;
        Ok(self.with_quote(maturity, rate))
    }

    /// Sets the interpolation type of the built curve.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationType) -> Self {
        self.config.interpolation = interpolation;
        self
    }

    /// Replaces the bootstrap settings.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    fn swap(&self, maturity: Date, rate: f64) -> CurveResult<Swap> {
        let one_year = self.effective_date.add_years(1)?;
        let frequency = if maturity <= one_year {
            Frequency::Zero
        } else {
            Frequency::Annual
        };
        Swap::with_calendar(
            self.effective_date,
            maturity,
            rate,
            frequency,
            self.fixed_day_count,
            self.calendar,
            BusinessDayConvention::ModifiedFollowing,
        )
    }

    /// Bootstraps the curve.
    pub fn build(&self) -> CurveResult<BootstrapResult> {
        if self.effective_date < self.valuation_date {
            return Err(CurveError::invalid_instrument(
                format!("OIS effective {}", self.effective_date),
                format!("starts before the valuation date {}", self.valuation_date),
            ));
        }
        let mut quotes = self.quotes.clone();
        quotes.sort_by_key(|(maturity, _)| *maturity);

        let mut instruments: Vec<CalibrationInstrument> = Vec::with_capacity(quotes.len() + 1);
        if self.effective_date > self.valuation_date {
            if let Some((_, rate)) = quotes.first() {
                instruments.push(
                    super::Deposit::new(
                        self.valuation_date,
                        self.effective_date,
                        *rate,
                        self.fixed_day_count,
                    )?
                    .into(),
                );
            }
        }
        for (maturity, rate) in quotes {
            instruments.push(self.swap(maturity, rate)?.into());
        }
        bootstrap(self.valuation_date, instruments, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Curve;
    use approx::assert_relative_eq;

    #[test]
    fn test_short_quote_is_single_period() {
        let valuation = Date::from_ymd(2024, 3, 1).unwrap();
        let result = OisBootstrapper::new(valuation)
            .with_tenor_quote("6M", 0.053)
            .unwrap()
            .with_tenor_quote("2Y", 0.047)
            .unwrap()
            .with_tenor_quote("5Y", 0.042)
            .unwrap()
            .build()
            .unwrap();
        assert!(result.report.is_valid());
        // 2024-09-01 is a Sunday, so the swap pays on 2024-09-02
        let maturity = result.instruments[0].maturity();
        let alpha = valuation.days_between(&maturity) as f64 / 360.0;
        assert_relative_eq!(result.curve.df(maturity), 1.0 / (1.0 + 0.053 * alpha), epsilon = 1e-12);
    }

    #[test]
    fn test_forward_start_inserts_deposit() {
        let valuation = Date::from_ymd(2024, 3, 1).unwrap();
        let spot = Date::from_ymd(2024, 3, 5).unwrap();
        let result = OisBootstrapper::new(valuation)
            .with_effective_date(spot)
            .with_tenor_quote("1Y", 0.05)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(result.instruments.len(), 2);
        assert!(result.curve.df(spot) < 1.0);
    }
}
