//! Business day calendars and conventions.
//!
//! This module provides:
//! - The [`Calendar`] trait and market calendars selected by [`CalendarType`]
//! - Business day adjustment conventions
//! - Rule-based holiday tables with Easter computus

mod china;
mod conventions;
mod holidays;
mod markets;

pub use china::ChinaInterbankCalendar;
pub use conventions::{adjust, BusinessDayConvention};
pub use holidays::{
    easter_sunday, last_weekday_of_month, nth_weekday_of_month, observed_date, HolidayRules,
    HolidayTable,
};
pub use markets::{Target2Calendar, UKCalendar, USCalendar};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Date;

/// Trait for business day calendars.
///
/// Calendars are stateless predicates once constructed; all derived
/// operations (rolling, business-day stepping, counting) are provided.
pub trait Calendar: Send + Sync {
    /// Returns the name of the calendar.
    fn name(&self) -> &'static str;

    /// Returns true if the date is a business day.
    fn is_business_day(&self, date: Date) -> bool;

    /// Returns true if the date is a holiday or weekend.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjusts a date according to the given business day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        conventions::adjust(date, convention, self)
    }

    /// Advances a date by a signed number of business days.
    fn add_business_days(&self, date: Date, days: i32) -> Date {
        let mut result = date;
        let mut remaining = days.abs();
        let direction: i64 = if days >= 0 { 1 } else { -1 };

        while remaining > 0 {
            result = result.add_days(direction);
            if self.is_business_day(result) {
                remaining -= 1;
            }
        }

        result
    }

    /// Returns the next business day on or after the given date.
    fn next_business_day(&self, date: Date) -> Date {
        self.adjust(date, BusinessDayConvention::Following)
    }

    /// Returns the previous business day on or before the given date.
    fn previous_business_day(&self, date: Date) -> Date {
        self.adjust(date, BusinessDayConvention::Preceding)
    }

    /// Counts business days in `(start, end]`.
    fn business_days_between(&self, start: Date, end: Date) -> i32 {
        let mut count = 0;
        let mut current = start.add_days(1);

        while current <= end {
            if self.is_business_day(current) {
                count += 1;
            }
            current = current.add_days(1);
        }

        count
    }

    /// All business days in `[start, end]`.
    fn business_days(&self, start: Date, end: Date) -> Vec<Date> {
        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_business_day(current) {
                days.push(current);
            }
            current = current.add_days(1);
        }
        days
    }
}

/// Every day is a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidayCalendar;

impl Calendar for NoHolidayCalendar {
    fn name(&self) -> &'static str {
        "None"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// Saturdays and Sundays are the only non-business days.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendCalendar;

impl Calendar for WeekendCalendar {
    fn name(&self) -> &'static str {
        "Weekend Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        date.is_weekday()
    }
}

/// Market calendars available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalendarType {
    /// Every day is a business day.
    None,
    /// Weekends only.
    #[default]
    Weekend,
    /// US Federal Reserve holidays.
    #[serde(alias = "US")]
    UnitedStates,
    /// UK bank holidays.
    #[serde(alias = "UK")]
    UnitedKingdom,
    /// TARGET2 settlement days.
    Target,
    /// China interbank market.
    ChinaIb,
}

impl CalendarType {
    /// Returns the shared calendar instance for this type.
    pub fn calendar(&self) -> &'static dyn Calendar {
        static NONE: NoHolidayCalendar = NoHolidayCalendar;
        static WEEKEND: WeekendCalendar = WeekendCalendar;
        match self {
            CalendarType::None => &NONE,
            CalendarType::Weekend => &WEEKEND,
            CalendarType::UnitedStates => USCalendar::global(),
            CalendarType::UnitedKingdom => UKCalendar::global(),
            CalendarType::Target => Target2Calendar::global(),
            CalendarType::ChinaIb => ChinaInterbankCalendar::global(),
        }
    }

    /// All calendar types.
    pub fn all() -> &'static [CalendarType] {
        &[
            CalendarType::None,
            CalendarType::Weekend,
            CalendarType::UnitedStates,
            CalendarType::UnitedKingdom,
            CalendarType::Target,
            CalendarType::ChinaIb,
        ]
    }
}

impl Calendar for CalendarType {
    fn name(&self) -> &'static str {
        self.calendar().name()
    }

    fn is_business_day(&self, date: Date) -> bool {
        self.calendar().is_business_day(date)
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalendarType::None => "NONE",
            CalendarType::Weekend => "WEEKEND",
            CalendarType::UnitedStates => "UNITED_STATES",
            CalendarType::UnitedKingdom => "UNITED_KINGDOM",
            CalendarType::Target => "TARGET",
            CalendarType::ChinaIb => "CHINA_IB",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CalendarType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "NONE" => Ok(CalendarType::None),
            "WEEKEND" => Ok(CalendarType::Weekend),
            "US" | "UNITED_STATES" => Ok(CalendarType::UnitedStates),
            "UK" | "UNITED_KINGDOM" => Ok(CalendarType::UnitedKingdom),
            "TARGET" | "TARGET2" => Ok(CalendarType::Target),
            "CHINA_IB" | "CN_IB" => Ok(CalendarType::ChinaIb),
            _ => Err(CoreError::invalid_input(format!("unknown calendar: {s}"))),
        }
    }
}

/// Calendar that combines several calendars: a day is a business day only
/// if it is one in every member.
#[derive(Debug, Clone, Default)]
pub struct JointCalendar {
    members: Vec<CalendarType>,
}

impl JointCalendar {
    /// Creates a joint calendar.
    pub fn new(members: Vec<CalendarType>) -> Self {
        Self { members }
    }

    /// The member calendars.
    pub fn members(&self) -> &[CalendarType] {
        &self.members
    }
}

impl Calendar for JointCalendar {
    fn name(&self) -> &'static str {
        "Joint"
    }

    fn is_business_day(&self, date: Date) -> bool {
        self.members.iter().all(|cal| cal.is_business_day(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_weekend_calendar() {
        let cal = WeekendCalendar;
        assert!(cal.is_business_day(d(2025, 1, 6)));
        assert!(!cal.is_business_day(d(2025, 1, 4)));
        assert!(!cal.is_business_day(d(2025, 1, 5)));
    }

    #[test]
    fn test_no_holiday_calendar() {
        assert!(CalendarType::None.is_business_day(d(2025, 1, 4)));
    }

    #[test]
    fn test_add_business_days() {
        let cal = WeekendCalendar;
        assert_eq!(cal.add_business_days(d(2025, 1, 3), 1), d(2025, 1, 6));
        assert_eq!(cal.add_business_days(d(2025, 1, 6), -1), d(2025, 1, 3));
        assert_eq!(cal.add_business_days(d(2025, 1, 6), 0), d(2025, 1, 6));
    }

    #[test]
    fn test_business_days_between() {
        let cal = WeekendCalendar;
        assert_eq!(cal.business_days_between(d(2025, 1, 6), d(2025, 1, 10)), 4);
        assert_eq!(cal.business_days(d(2025, 1, 3), d(2025, 1, 7)).len(), 3);
    }

    #[test]
    fn test_joint_calendar() {
        let joint = JointCalendar::new(vec![CalendarType::UnitedStates, CalendarType::UnitedKingdom]);
        // US Independence Day, UK business day
        assert!(!joint.is_business_day(d(2025, 7, 4)));
        // UK Summer Bank Holiday, US business day
        assert!(!joint.is_business_day(d(2025, 8, 25)));
        assert!(joint.is_business_day(d(2025, 8, 26)));
    }

    #[test]
    fn test_calendar_type_parse() {
        assert_eq!("us".parse::<CalendarType>().unwrap(), CalendarType::UnitedStates);
        assert_eq!("CHINA_IB".parse::<CalendarType>().unwrap(), CalendarType::ChinaIb);
        assert!("MARS".parse::<CalendarType>().is_err());
        for cal in CalendarType::all() {
            assert_eq!(cal.to_string().parse::<CalendarType>().unwrap(), *cal);
        }
    }
}
