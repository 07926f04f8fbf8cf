//! Calibration instruments for the bootstrappers.
//!
//! Every instrument is valued for a unit notional from the point of view of
//! the party receiving the quoted rate, so a correctly calibrated curve
//! values each one at zero:
//!
//! ```text
//! Deposit / FRA:  df(end) (1 + r α) - df(start)
//! Swap:           c Σ α_i df(pay_i) - (df(effective) - df(maturity))
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::{DayCount, DayCountType};
use strike_core::schedule::{DateGenRule, Schedule};
use strike_core::types::Frequency;
use strike_core::Date;

use crate::error::{CurveError, CurveResult};
use crate::traits::Curve;

/// Instrument family, used for ordering checks and repricing tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    /// Money market deposit.
    Deposit,
    /// Forward rate agreement.
    Fra,
    /// Fixed-for-floating swap.
    Swap,
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::Fra => write!(f, "FRA"),
            Self::Swap => write!(f, "Swap"),
        }
    }
}

fn accrual(day_count: DayCountType, start: Date, end: Date) -> CurveResult<f64> {
    Ok(day_count.year_frac(start, end, Some(end), None)?.alpha)
}

fn check_period(kind: InstrumentKind, start: Date, end: Date, rate: f64) -> CurveResult<()> {
    if end <= start {
        return Err(CurveError::invalid_instrument(
            format!("{kind} {start} to {end}"),
            "end date must be after start date",
        ));
    }
    if !rate.is_finite() {
        return Err(CurveError::invalid_input(format!("{kind} rate {rate} is not finite")));
    }
    Ok(())
}

/// A money market deposit paying `1 + r α` at `end` for 1 lent at `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Deposit {
    start: Date,
    end: Date,
    rate: f64,
    day_count: DayCountType,
    alpha: f64,
}

impl Deposit {
    /// Creates a deposit.
    pub fn new(start: Date, end: Date, rate: f64, day_count: DayCountType) -> CurveResult<Self> {
        check_period(InstrumentKind::Deposit, start, end, rate)?;
        let alpha = accrual(day_count, start, end)?;
        Ok(Self {
            start,
            end,
            rate,
            day_count,
            alpha,
        })
    }

    /// Creates a deposit starting at `start` and maturing after `tenor`
    /// (e.g. `"3M"`), rolled on `calendar` with modified following.
    pub fn from_tenor(
        start: Date,
        tenor: &str,
        rate: f64,
        day_count: DayCountType,
        calendar: CalendarType,
    ) -> CurveResult<Self> {
        use strike_core::calendars::Calendar;
        let end = calendar.adjust(
            start.add_tenor_str(tenor)?,
            BusinessDayConvention::ModifiedFollowing,
        );
        Self::new(start, end, rate, day_count)
    }

    /// Start date.
    pub fn start(&self) -> Date {
        self.start
    }

    /// Maturity date.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Quoted rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Accrual day count.
    pub fn day_count(&self) -> DayCountType {
        self.day_count
    }

    /// Accrual fraction.
    pub fn accrual(&self) -> f64 {
        self.alpha
    }

    /// Value per unit notional on `curve`.
    pub fn pv<C: Curve + ?Sized>(&self, curve: &C) -> f64 {
        curve.df(self.end) * (1.0 + self.rate * self.alpha) - curve.df(self.start)
    }
}

/// A forward rate agreement on `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fra {
    start: Date,
    end: Date,
    rate: f64,
    day_count: DayCountType,
    alpha: f64,
}

impl Fra {
    /// Creates an FRA.
    pub fn new(start: Date, end: Date, rate: f64, day_count: DayCountType) -> CurveResult<Self> {
        check_period(InstrumentKind::Fra, start, end, rate)?;
        let alpha = accrual(day_count, start, end)?;
        Ok(Self {
            start,
            end,
            rate,
            day_count,
            alpha,
        })
    }

    /// Start date.
    pub fn start(&self) -> Date {
        self.start
    }

    /// Maturity date.
    pub fn end(&self) -> Date {
        self.end
    }

    /// Quoted rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Accrual day count.
    pub fn day_count(&self) -> DayCountType {
        self.day_count
    }

    /// Accrual fraction.
    pub fn accrual(&self) -> f64 {
        self.alpha
    }

    /// Value per unit notional on `curve`.
    pub fn pv<C: Curve + ?Sized>(&self, curve: &C) -> f64 {
        curve.df(self.end) * (1.0 + self.rate * self.alpha) - curve.df(self.start)
    }
}

/// A par fixed-for-floating swap, single curve, so the floating leg is
/// worth `df(effective) - df(maturity)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Swap {
    coupon: f64,
    day_count: DayCountType,
    schedule: Schedule,
    accruals: Vec<f64>,
}

impl Swap {
    /// Creates a swap with a weekend calendar, modified following rolling
    /// and backward generation.
    pub fn new(
        effective: Date,
        maturity: Date,
        coupon: f64,
        frequency: Frequency,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        Self::with_calendar(
            effective,
            maturity,
            coupon,
            frequency,
            day_count,
            CalendarType::Weekend,
            BusinessDayConvention::ModifiedFollowing,
        )
    }

    /// Creates a swap with an explicit calendar and convention.
    pub fn with_calendar(
        effective: Date,
        maturity: Date,
        coupon: f64,
        frequency: Frequency,
        day_count: DayCountType,
        calendar: CalendarType,
        convention: BusinessDayConvention,
    ) -> CurveResult<Self> {
        check_period(InstrumentKind::Swap, effective, maturity, coupon)?;
        let schedule = Schedule::generate(
            effective,
            maturity,
            frequency,
            calendar,
            convention,
            DateGenRule::Backward,
        )?;
        let accruals = schedule.year_fractions(day_count)?;
        Ok(Self {
            coupon,
            day_count,
            schedule,
            accruals,
        })
    }

    /// Creates a swap maturing `tenor` after `effective`.
    pub fn from_tenor(
        effective: Date,
        tenor: &str,
        coupon: f64,
        frequency: Frequency,
        day_count: DayCountType,
    ) -> CurveResult<Self> {
        Self::new(effective, effective.add_tenor_str(tenor)?, coupon, frequency, day_count)
    }

    /// Adjusted effective date.
    pub fn effective(&self) -> Date {
        self.schedule.dates()[0]
    }

    /// Adjusted final payment date.
    pub fn maturity(&self) -> Date {
        let dates = self.schedule.dates();
        dates[dates.len() - 1]
    }

    /// Fixed coupon.
    pub fn coupon(&self) -> f64 {
        self.coupon
    }

    /// Fixed leg day count.
    pub fn day_count(&self) -> DayCountType {
        self.day_count
    }

    /// Fixed leg schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Fixed leg annuity `Σ α_i df(pay_i)`.
    pub fn annuity<C: Curve + ?Sized>(&self, curve: &C) -> f64 {
        self.accruals
            .iter()
            .zip(self.schedule.payment_dates())
            .map(|(alpha, pay)| alpha * curve.df(*pay))
            .sum()
    }

    /// Value per unit notional to the fixed receiver on `curve`.
    pub fn pv<C: Curve + ?Sized>(&self, curve: &C) -> f64 {
        self.coupon * self.annuity(curve) - (curve.df(self.effective()) - curve.df(self.maturity()))
    }
}

/// Any instrument the bootstrappers calibrate to.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationInstrument {
    /// Money market deposit.
    Deposit(Deposit),
    /// Forward rate agreement.
    Fra(Fra),
    /// Fixed-for-floating swap.
    Swap(Swap),
}

impl CalibrationInstrument {
    /// Instrument family.
    pub fn kind(&self) -> InstrumentKind {
        match self {
            Self::Deposit(_) => InstrumentKind::Deposit,
            Self::Fra(_) => InstrumentKind::Fra,
            Self::Swap(_) => InstrumentKind::Swap,
        }
    }

    /// First date the instrument depends on.
    pub fn start(&self) -> Date {
        match self {
            Self::Deposit(d) => d.start(),
            Self::Fra(f) => f.start(),
            Self::Swap(s) => s.effective(),
        }
    }

    /// Date of the knot the instrument determines.
    pub fn maturity(&self) -> Date {
        match self {
            Self::Deposit(d) => d.end(),
            Self::Fra(f) => f.end(),
            Self::Swap(s) => s.maturity(),
        }
    }

    /// Quoted rate or coupon.
    pub fn rate(&self) -> f64 {
        match self {
            Self::Deposit(d) => d.rate(),
            Self::Fra(f) => f.rate(),
            Self::Swap(s) => s.coupon(),
        }
    }

    /// Value per unit notional on `curve`.
    pub fn pv<C: Curve + ?Sized>(&self, curve: &C) -> f64 {
        match self {
            Self::Deposit(d) => d.pv(curve),
            Self::Fra(f) => f.pv(curve),
            Self::Swap(s) => s.pv(curve),
        }
    }

    /// Short human-readable description.
    pub fn description(&self) -> String {
        format!(
            "{} {:.4}% {} to {}",
            self.kind(),
            self.rate() * 100.0,
            self.start(),
            self.maturity()
        )
    }
}

impl From<Deposit> for CalibrationInstrument {
    fn from(d: Deposit) -> Self {
        Self::Deposit(d)
    }
}

impl From<Fra> for CalibrationInstrument {
    fn from(f: Fra) -> Self {
        Self::Fra(f)
    }
}

impl From<Swap> for CalibrationInstrument {
    fn from(s: Swap) -> Self {
        Self::Swap(s)
    }
}
