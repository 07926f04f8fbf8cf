//! Single-curve IBOR bootstrap from deposits, FRAs and swaps.

use strike_core::daycounts::DayCountType;
use strike_core::Date;

use super::engine::{bootstrap, BootstrapConfig};
use super::instruments::{CalibrationInstrument, Deposit, Fra, Swap};
use super::repricing::BootstrapResult;
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationType;

/// Builds a discount curve that reprices deposits, FRAs and swaps.
///
/// Deposits come first, then FRAs, then swaps, each group ordered by
/// maturity. No deposit may start before the valuation date, no FRA before
/// the last deposit matures, and no swap may mature before the last FRA
/// ends. When the first instrument starts after the valuation date a
/// deposit from the valuation date to that start, at the first quoted
/// rate, is inserted ahead of it.
///
/// ```rust
/// use strike_core::daycounts::DayCountType;
/// use strike_core::types::Frequency;
/// use strike_core::Date;
/// use strike_curves::bootstrap::{IborBootstrapper, Swap};
/// use strike_curves::Curve;
///
/// let valuation = Date::from_ymd(2021, 3, 15).unwrap();
/// let swap = |years: i32, rate: f64| {
///     Swap::new(valuation, valuation.add_years(years).unwrap(), rate, Frequency::Annual, DayCountType::ThirtyE360)
///         .unwrap()
/// };
/// let result = IborBootstrapper::new(valuation)
///     .with_swap(swap(1, 0.035))
///     .with_swap(swap(2, 0.040))
///     .build()
///     .unwrap();
/// let df_1y = result.curve.df(Date::from_ymd(2022, 3, 15).unwrap());
/// assert!((df_1y - 1.0 / 1.035).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct IborBootstrapper {
    valuation_date: Date,
    deposits: Vec<Deposit>,
    fras: Vec<Fra>,
    swaps: Vec<Swap>,
    config: BootstrapConfig,
}

impl IborBootstrapper {
    /// Creates an empty bootstrapper.
    #[must_use]
    pub fn new(valuation_date: Date) -> Self {
        Self {
            valuation_date,
            deposits: Vec::new(),
            fras: Vec::new(),
            swaps: Vec::new(),
            config: BootstrapConfig::default(),
        }
    }

    /// Adds a deposit.
    #[must_use]
    pub fn with_deposit(mut self, deposit: Deposit) -> Self {
        self.deposits.push(deposit);
        self
    }

    /// Adds an FRA.
    #[must_use]
    pub fn with_fra(mut self, fra: Fra) -> Self {
        self.fras.push(fra);
        self
    }

    /// Adds a swap.
    #[must_use]
    pub fn with_swap(mut self, swap: Swap) -> Self {
        self.swaps.push(swap);
        self
    }

    /// Adds several deposits.
    #[must_use]
    pub fn with_deposits(mut self, deposits: impl IntoIterator<Item = Deposit>) -> Self {
        self.deposits.extend(deposits);
        self
    }

    /// Adds several FRAs.
    #[must_use]
    pub fn with_fras(mut self, fras: impl IntoIterator<Item = Fra>) -> Self {
        self.fras.extend(fras);
        self
    }

    /// Adds several swaps.
    #[must_use]
    pub fn with_swaps(mut self, swaps: impl IntoIterator<Item = Swap>) -> Self {
        self.swaps.extend(swaps);
        self
    }

    /// Sets the interpolation type of the built curve.
    #[must_use]
    pub fn with_interpolation(mut self, interpolation: InterpolationType) -> Self {
        self.config.interpolation = interpolation;
        self
    }

    /// Sets the day count measuring curve time.
    #[must_use]
    pub fn with_day_count(mut self, day_count: DayCountType) -> Self {
        self.config.day_count = day_count;
        self
    }

    /// Replaces the bootstrap settings.
    #[must_use]
    pub fn with_config(mut self, config: BootstrapConfig) -> Self {
        self.config = config;
        self
    }

    /// Checks instrument ordering against the valuation date and each
    /// other.
    pub fn validate(&self) -> CurveResult<()> {
        if self.deposits.is_empty() && self.fras.is_empty() && self.swaps.is_empty() {
            return Err(CurveError::invalid_input("no calibration instruments"));
        }

        let mut last_deposit_end = None;
        for depo in &self.deposits {
            let inst = CalibrationInstrument::from(depo.clone());
            if depo.start() < self.valuation_date {
                return Err(CurveError::invalid_instrument(
                    inst.description(),
                    format!("starts before the valuation date {}", self.valuation_date),
                ));
            }
            if last_deposit_end.is_some_and(|prev| depo.end() <= prev) {
                return Err(CurveError::invalid_instrument(
                    inst.description(),
                    "deposit maturities must be strictly increasing",
                ));
            }
            last_deposit_end = Some(depo.end());
        }

        let mut last_fra_end = None;
        for fra in &self.fras {
            let inst = CalibrationInstrument::from(fra.clone());
            if let Some(end) = last_deposit_end {
                if fra.start() < end {
                    return Err(CurveError::invalid_instrument(
                        inst.description(),
                        format!("starts before the last deposit matures on {end}"),
                    ));
                }
            }
            if last_fra_end.is_some_and(|prev| fra.end() <= prev) {
                return Err(CurveError::invalid_instrument(
                    inst.description(),
                    "FRA maturities must be strictly increasing",
                ));
            }
            last_fra_end = Some(fra.end());
        }

        let mut last_swap_end = None;
        let previous_end = last_fra_end.or(last_deposit_end);
        for swap in &self.swaps {
            let inst = CalibrationInstrument::from(swap.clone());
            if let Some(end) = previous_end {
                if swap.maturity() <= end {
                    return Err(CurveError::invalid_instrument(
                        inst.description(),
                        format!("matures on or before the last money market maturity {end}"),
                    ));
                }
            }
            if last_swap_end.is_some_and(|prev| swap.maturity() <= prev) {
                return Err(CurveError::invalid_instrument(
                    inst.description(),
                    "swap maturities must be strictly increasing",
                ));
            }
            last_swap_end = Some(swap.maturity());
        }
        Ok(())
    }

    /// Calibration instruments in knot order, with the synthetic deposit
    /// when one is needed.
    pub fn instruments(&self) -> CurveResult<Vec<CalibrationInstrument>> {
        let mut instruments: Vec<CalibrationInstrument> = self
            .deposits
            .iter()
            .cloned()
            .map(Into::into)
            .chain(self.fras.iter().cloned().map(Into::into))
            .chain(self.swaps.iter().cloned().map(Into::into))
            .collect();

        if let Some(first) = instruments.first() {
            if first.start() > self.valuation_date {
                let day_count = match first {
                    CalibrationInstrument::Deposit(d) => d.day_count(),
                    CalibrationInstrument::Fra(f) => f.day_count(),
                    CalibrationInstrument::Swap(_) => DayCountType::Act360,
                };
                let synthetic =
                    Deposit::new(self.valuation_date, first.start(), first.rate(), day_count)?;
                instruments.insert(0, synthetic.into());
            }
        }
        Ok(instruments)
    }

    /// Bootstraps the curve.
    pub fn build(&self) -> CurveResult<BootstrapResult> {
        self.validate()?;
        bootstrap(self.valuation_date, self.instruments()?, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Curve;
    use approx::assert_relative_eq;
    use strike_core::types::Frequency;
    use strike_core::ErrorKind;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn market(valuation: Date) -> IborBootstrapper {
        let dc = DayCountType::Act360;
        IborBootstrapper::new(valuation)
            .with_deposit(Deposit::new(valuation, d(2024, 4, 2), 0.0530, dc).unwrap())
            .with_deposit(Deposit::new(valuation, d(2024, 7, 2), 0.0525, dc).unwrap())
            .with_fra(Fra::new(d(2024, 7, 2), d(2024, 10, 2), 0.0510, dc).unwrap())
            .with_fra(Fra::new(d(2024, 10, 2), d(2025, 1, 2), 0.0495, dc).unwrap())
            .with_swaps([2, 3, 5, 7, 10].into_iter().zip([0.046, 0.044, 0.042, 0.041, 0.0405]).map(
                |(years, rate)| {
                    Swap::new(
                        valuation,
                        valuation.add_years(years).unwrap(),
                        rate,
                        Frequency::SemiAnnual,
                        DayCountType::Thirty360Bond,
                    )
                    .unwrap()
                },
            ))
    }

    #[test]
    fn test_reprices_every_interpolation() {
        let valuation = d(2024, 1, 2);
        for kind in InterpolationType::all() {
            let result = market(valuation).with_interpolation(*kind).build().unwrap();
            assert!(result.report.is_valid(), "{kind}: {}", result.report);
            assert_eq!(result.curve.len(), 10);
            assert_eq!(result.curve.df(valuation), 1.0);
        }
    }

    #[test]
    fn test_deposit_closed_form() {
        let valuation = d(2024, 1, 2);
        let result = market(valuation).build().unwrap();
        let alpha = 91.0 / 360.0;
        assert_relative_eq!(
            result.curve.df(d(2024, 4, 2)),
            1.0 / (1.0 + 0.0530 * alpha),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_synthetic_deposit_is_inserted() {
        let valuation = d(2024, 1, 2);
        let spot = d(2024, 1, 4);
        let result = IborBootstrapper::new(valuation)
            .with_deposit(Deposit::new(spot, d(2024, 4, 4), 0.05, DayCountType::Act360).unwrap())
            .build()
            .unwrap();
        assert_eq!(result.instruments.len(), 2);
        assert_eq!(result.instruments[0].maturity(), spot);
        assert!(result.report.is_valid());
    }

    #[test]
    fn test_ordering_violations_are_domain_errors() {
        let valuation = d(2024, 1, 2);
        let dc = DayCountType::Act360;
        let early = IborBootstrapper::new(valuation)
            .with_deposit(Deposit::new(d(2023, 12, 29), d(2024, 3, 29), 0.05, dc).unwrap());
        assert_eq!(early.build().unwrap_err().kind(), ErrorKind::Domain);

        let overlapping = IborBootstrapper::new(valuation)
            .with_deposit(Deposit::new(valuation, d(2024, 7, 2), 0.05, dc).unwrap())
            .with_fra(Fra::new(d(2024, 4, 2), d(2024, 10, 2), 0.05, dc).unwrap());
        assert_eq!(overlapping.build().unwrap_err().kind(), ErrorKind::Domain);

        let swaps = IborBootstrapper::new(valuation)
            .with_fra(Fra::new(valuation, d(2026, 1, 2), 0.05, dc).unwrap())
            .with_swap(
                Swap::new(valuation, d(2025, 1, 2), 0.05, Frequency::Annual, dc).unwrap(),
            );
        assert_eq!(swaps.build().unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_empty_is_input_validation() {
        let err = IborBootstrapper::new(d(2024, 1, 2)).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputValidation);
    }
}
