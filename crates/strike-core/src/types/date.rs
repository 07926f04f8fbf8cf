//! Date type for financial calculations.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{CoreError, CoreResult};
use crate::types::{Tenor, TenorUnit};

/// Serial number of 1899-12-30, the spreadsheet epoch.
const SERIAL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// A civil calendar date.
///
/// Newtype over `chrono::NaiveDate`. Dates are immutable; every arithmetic
/// operation returns a new value. Construction validates the day against the
/// month length under the Gregorian leap-year rule.
///
/// # Example
///
/// ```rust
/// use strike_core::types::Date;
///
/// let date = Date::from_ymd(2025, 6, 15).unwrap();
/// let future = date.add_months(6).unwrap();
/// assert_eq!(future.year(), 2025);
/// assert_eq!(future.month(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the triple is not a calendar date
    /// (month 13, day 32, 29 February of a common year, ...).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CoreResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from day, month, year order.
    pub fn from_dmy(day: u32, month: u32, year: i32) -> CoreResult<Self> {
        Self::from_ymd(year, month, day)
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> CoreResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|_| CoreError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Creates a date from its spreadsheet serial number (1899-12-30 = 0).
    pub fn from_serial(serial: i64) -> CoreResult<Self> {
        let days = i64::from(SERIAL_EPOCH_DAYS_FROM_CE) + serial;
        i32::try_from(days)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(Date)
            .ok_or_else(|| CoreError::invalid_date(format!("serial {serial} out of range")))
    }

    /// Returns the spreadsheet serial number (days since 1899-12-30).
    #[must_use]
    pub fn serial(&self) -> i64 {
        i64::from(self.0.num_days_from_ce() - SERIAL_EPOCH_DAYS_FROM_CE)
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the day of year (1-366).
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    /// Checks if the year is a leap year.
    #[must_use]
    pub fn is_leap_year(&self) -> bool {
        is_leap_year(self.year())
    }

    /// Returns the number of days in the date's month.
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Returns the number of days in the date's year.
    #[must_use]
    pub fn days_in_year(&self) -> u32 {
        if self.is_leap_year() {
            366
        } else {
            365
        }
    }

    /// Adds a number of calendar days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Adds weekdays, skipping Saturdays and Sundays.
    ///
    /// Positive values move forward, negative values move backward. Holidays
    /// are not considered; use [`Calendar::add_business_days`] for that.
    ///
    /// [`Calendar::add_business_days`]: crate::calendars::Calendar::add_business_days
    #[must_use]
    pub fn add_weekdays(&self, days: i32) -> Self {
        if days == 0 {
            return *self;
        }

        let direction = if days > 0 { 1i64 } else { -1i64 };
        let mut remaining = days.abs();
        let mut current = *self;

        while remaining > 0 {
            current = current.add_days(direction);
            if current.is_weekday() {
                remaining -= 1;
            }
        }

        current
    }

    /// Adds a number of months to the date.
    ///
    /// If the resulting day would be invalid (e.g., Jan 31 + 1 month),
    /// it rolls back to the last valid day of the month.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is out of range.
    pub fn add_months(&self, months: i32) -> CoreResult<Self> {
        let total_months = self.year() * 12 + self.month() as i32 - 1 + months;
        let new_year = total_months.div_euclid(12);
        let new_month = (total_months.rem_euclid(12) + 1) as u32;

        let new_day = self.day().min(days_in_month(new_year, new_month));

        Self::from_ymd(new_year, new_month, new_day)
    }

    /// Adds months and, when the start date is the last day of its month,
    /// lands on the last day of the target month.
    pub fn add_months_eom(&self, months: i32) -> CoreResult<Self> {
        let shifted = self.add_months(months)?;
        if self.is_end_of_month() {
            Ok(shifted.end_of_month())
        } else {
            Ok(shifted)
        }
    }

    /// Adds a number of years to the date.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDate` if the result is invalid.
    pub fn add_years(&self, years: i32) -> CoreResult<Self> {
        self.add_months(years * 12)
    }

    /// Adds a tenor such as `3M` or `1Y`.
    pub fn add_tenor(&self, tenor: &Tenor) -> CoreResult<Self> {
        let n = tenor.count();
        match tenor.unit() {
            TenorUnit::Days => Ok(self.add_days(i64::from(n))),
            TenorUnit::Weeks => Ok(self.add_days(7 * i64::from(n))),
            TenorUnit::Months => self.add_months(n),
            TenorUnit::Years => self.add_years(n),
        }
    }

    /// Parses and adds a tenor string of the form `N[D|W|M|Y]`.
    ///
    /// A leading `-` moves backwards: `"-6M"`.
    pub fn add_tenor_str(&self, tenor: &str) -> CoreResult<Self> {
        let tenor: Tenor = tenor.parse()?;
        self.add_tenor(&tenor)
    }

    /// Calculates the number of calendar days from `self` to `other`.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the last day of the month.
    #[must_use]
    pub fn end_of_month(&self) -> Self {
        Date(self.0.with_day(self.days_in_month()).unwrap_or(self.0))
    }

    /// Checks if the date is the end of month.
    #[must_use]
    pub fn is_end_of_month(&self) -> bool {
        self.day() == self.days_in_month()
    }

    /// Returns the first day of the month.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        Date(self.0.with_day(1).unwrap_or(self.0))
    }

    /// Returns the day of week.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Checks if the date is a weekend (Saturday or Sunday).
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Checks if the date is a weekday (Monday through Friday).
    #[must_use]
    pub fn is_weekday(&self) -> bool {
        !self.is_weekend()
    }

    /// Returns the third Wednesday of the date's month.
    #[must_use]
    pub fn third_wednesday(&self) -> Self {
        let first = self.start_of_month();
        let offset = (7 + Weekday::Wed.num_days_from_monday() as i64
            - first.weekday().num_days_from_monday() as i64)
            % 7;
        first.add_days(offset + 14)
    }

    /// Checks if the date is an IMM date (third Wednesday of Mar, Jun, Sep, Dec).
    #[must_use]
    pub fn is_imm(&self) -> bool {
        matches!(self.month(), 3 | 6 | 9 | 12) && *self == self.third_wednesday()
    }

    /// Returns the next IMM date strictly after this date.
    #[must_use]
    pub fn next_imm(&self) -> Self {
        let mut month_start = self.start_of_month();
        loop {
            if matches!(month_start.month(), 3 | 6 | 9 | 12) {
                let imm = month_start.third_wednesday();
                if imm > *self {
                    return imm;
                }
            }
            month_start = month_start.end_of_month().add_days(1);
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for Date {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s)
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Add<i64> for Date {
    type Output = Self;

    /// Adds days to a date.
    fn add(self, days: i64) -> Self::Output {
        self.add_days(days)
    }
}

impl Sub<i64> for Date {
    type Output = Self;

    /// Subtracts days from a date.
    fn sub(self, days: i64) -> Self::Output {
        self.add_days(-days)
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}

/// Number of days in a month under the Gregorian calendar.
///
/// Returns 0 for an out-of-range month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Gregorian leap-year rule.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
