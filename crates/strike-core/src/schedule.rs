//! Cash-flow schedule generation.
//!
//! Raw dates are produced by stepping `k` whole periods from an anchor
//! (the start date for forward generation, the maturity for backward
//! generation), so that month-end clamping never accumulates. Each raw date
//! is then rolled with the business day convention, and adjacent duplicates
//! are collapsed.
//!
//! ```rust
//! use strike_core::calendars::{BusinessDayConvention, CalendarType};
//! use strike_core::schedule::{DateGenRule, Schedule};
//! use strike_core::types::{Date, Frequency};
//!
//! let schedule = Schedule::builder(
//!     Date::from_ymd(2020, 1, 15).unwrap(),
//!     Date::from_ymd(2021, 7, 15).unwrap(),
//!     Frequency::SemiAnnual,
//! )
//! .with_calendar(CalendarType::Weekend)
//! .with_convention(BusinessDayConvention::ModifiedFollowing)
//! .with_rule(DateGenRule::Backward)
//! .build()
//! .unwrap();
//!
//! assert_eq!(schedule.dates().len(), 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::calendars::{BusinessDayConvention, Calendar, CalendarType};
use crate::daycounts::{DayCount, DayCountType};
use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// Direction in which raw schedule dates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateGenRule {
    /// Step forward from the start date; any stub is at the back.
    Forward,
    /// Step backward from maturity; any stub is at the front.
    #[default]
    Backward,
}

/// Length of the irregular period when the frequency does not divide the
/// interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StubType {
    /// Keep the short period.
    #[default]
    Short,
    /// Merge the short period into its neighbour.
    Long,
}

/// Builder for [`Schedule`].
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    start: Date,
    maturity: Date,
    frequency: Frequency,
    calendar: CalendarType,
    convention: BusinessDayConvention,
    rule: DateGenRule,
    end_of_month: bool,
    stub: StubType,
    adjust_maturity: bool,
}

impl ScheduleBuilder {
    /// Sets the calendar.
    #[must_use]
    pub fn with_calendar(mut self, calendar: CalendarType) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the business day convention.
    #[must_use]
    pub fn with_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Sets the generation rule.
    #[must_use]
    pub fn with_rule(mut self, rule: DateGenRule) -> Self {
        self.rule = rule;
        self
    }

    /// Rolls raw dates to month end when the anchor is a month end.
    #[must_use]
    pub fn with_end_of_month(mut self, eom: bool) -> Self {
        self.end_of_month = eom;
        self
    }

    /// Sets the stub handling.
    #[must_use]
    pub fn with_stub(mut self, stub: StubType) -> Self {
        self.stub = stub;
        self
    }

    /// Whether the maturity itself is rolled by the convention.
    #[must_use]
    pub fn with_adjusted_maturity(mut self, adjust: bool) -> Self {
        self.adjust_maturity = adjust;
        self
    }

    /// Generates the schedule.
    pub fn build(self) -> CoreResult<Schedule> {
        if self.maturity <= self.start {
            return Err(CoreError::schedule(format!(
                "maturity {} must be after start {}",
                self.maturity, self.start
            )));
        }

        let raw = if self.frequency.is_zero() {
            vec![self.start, self.maturity]
        } else {
            self.raw_dates()?
        };

        let calendar = self.calendar.calendar();
        let last = raw.len() - 1;
        let mut adjusted: Vec<Date> = Vec::with_capacity(raw.len());
        for (i, date) in raw.iter().enumerate() {
            let rolled = if i == last && !self.adjust_maturity {
                *date
            } else {
                calendar.adjust(*date, self.convention)
            };
            if adjusted.last() != Some(&rolled) {
                adjusted.push(rolled);
            }
        }

        if adjusted.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CoreError::schedule(
                "adjusted schedule dates are not strictly increasing",
            ));
        }

        Ok(Schedule {
            unadjusted: raw,
            dates: adjusted,
            frequency: self.frequency,
            calendar: self.calendar,
            convention: self.convention,
        })
    }

    fn step(&self, anchor: Date, months: i32) -> CoreResult<Date> {
        if self.end_of_month {
            anchor.add_months_eom(months)
        } else {
            anchor.add_months(months)
        }
    }

    fn raw_dates(&self) -> CoreResult<Vec<Date>> {
        let months = self.frequency.months_per_period() as i32;
        let mut dates = Vec::new();

        match self.rule {
            DateGenRule::Forward => {
                dates.push(self.start);
                let mut k = 1;
                loop {
                    let next = self.step(self.start, k * months)?;
                    if next >= self.maturity {
                        break;
                    }
                    dates.push(next);
                    k += 1;
                }
                if self.stub == StubType::Long
                    && dates.len() > 1
                    && self.step(self.start, k * months)? > self.maturity
                {
                    dates.pop();
                }
                dates.push(self.maturity);
            }
            DateGenRule::Backward => {
                dates.push(self.maturity);
                let mut k = 1;
                loop {
                    let prev = self.step(self.maturity, -k * months)?;
                    if prev <= self.start {
                        break;
                    }
                    dates.push(prev);
                    k += 1;
                }
                if self.stub == StubType::Long
                    && dates.len() > 1
                    && self.step(self.maturity, -k * months)? < self.start
                {
                    dates.pop();
                }
                dates.push(self.start);
                dates.reverse();
            }
        }

        Ok(dates)
    }
}

/// An ordered set of adjusted schedule dates, first = start, last = maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    unadjusted: Vec<Date>,
    dates: Vec<Date>,
    frequency: Frequency,
    calendar: CalendarType,
    convention: BusinessDayConvention,
}

impl Schedule {
    /// Starts a builder with weekend calendar, following convention and
    /// backward generation.
    #[must_use]
    pub fn builder(start: Date, maturity: Date, frequency: Frequency) -> ScheduleBuilder {
        ScheduleBuilder {
            start,
            maturity,
            frequency,
            calendar: CalendarType::Weekend,
            convention: BusinessDayConvention::Following,
            rule: DateGenRule::Backward,
            end_of_month: false,
            stub: StubType::Short,
            adjust_maturity: true,
        }
    }

    /// Generates a schedule with the given calendar and convention.
    pub fn generate(
        start: Date,
        maturity: Date,
        frequency: Frequency,
        calendar: CalendarType,
        convention: BusinessDayConvention,
        rule: DateGenRule,
    ) -> CoreResult<Self> {
        Self::builder(start, maturity, frequency)
            .with_calendar(calendar)
            .with_convention(convention)
            .with_rule(rule)
            .build()
    }

    /// Adjusted dates in chronological order.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Raw dates before business day adjustment.
    pub fn unadjusted_dates(&self) -> &[Date] {
        &self.unadjusted
    }

    /// The schedule frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The calendar used for adjustment.
    pub fn calendar(&self) -> CalendarType {
        self.calendar
    }

    /// The business day convention used for adjustment.
    pub fn convention(&self) -> BusinessDayConvention {
        self.convention
    }

    /// Consecutive `(start, end)` accrual periods.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }

    /// Payment dates (all dates after the first).
    pub fn payment_dates(&self) -> &[Date] {
        &self.dates[1..]
    }

    /// Accrual fraction of each period under `day_count`.
    pub fn year_fractions(&self, day_count: DayCountType) -> CoreResult<Vec<f64>> {
        let freq = (!self.frequency.is_zero()).then_some(self.frequency);
        self.periods()
            .map(|(start, end)| Ok(day_count.year_frac(start, end, Some(end), freq)?.alpha))
            .collect()
    }
}
