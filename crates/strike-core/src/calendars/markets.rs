//! US, UK and TARGET2 market calendars.

use chrono::{Datelike, NaiveDate, Weekday};
use std::sync::OnceLock;

use super::holidays::{last_weekday_of_month, nth_weekday_of_month, HolidayRules, HolidayTable};
use super::Calendar;
use crate::types::Date;

static US_CALENDAR: OnceLock<USCalendar> = OnceLock::new();
static UK_CALENDAR: OnceLock<UKCalendar> = OnceLock::new();
static TARGET2_CALENDAR: OnceLock<Target2Calendar> = OnceLock::new();

fn weekday_and_not_in(table: &HolidayTable, date: Date) -> bool {
    date.is_weekday() && !table.contains(date.as_naive_date())
}

/// US Federal Reserve calendar.
#[derive(Debug, Clone)]
pub struct USCalendar {
    holidays: HolidayTable,
}

impl USCalendar {
    /// Builds the calendar.
    pub fn new() -> Self {
        let holidays = HolidayRules::new()
            .fixed(1, 1, true)
            .nth_weekday(1, Weekday::Mon, 3)
            .nth_weekday(2, Weekday::Mon, 3)
            .last_weekday(5, Weekday::Mon)
            .fixed_from(6, 19, 2021, true)
            .fixed(7, 4, true)
            .nth_weekday(9, Weekday::Mon, 1)
            .nth_weekday(10, Weekday::Mon, 2)
            .fixed(11, 11, true)
            .nth_weekday(11, Weekday::Thu, 4)
            .fixed(12, 25, true)
            .build();
        Self { holidays }
    }

    /// Shared instance.
    pub fn global() -> &'static USCalendar {
        US_CALENDAR.get_or_init(USCalendar::new)
    }
}

impl Default for USCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar for USCalendar {
    fn name(&self) -> &'static str {
        "US Federal Reserve"
    }

    fn is_business_day(&self, date: Date) -> bool {
        weekday_and_not_in(&self.holidays, date)
    }
}

/// UK bank holidays (England and Wales).
#[derive(Debug, Clone)]
pub struct UKCalendar {
    holidays: HolidayTable,
}

impl UKCalendar {
    /// Builds the calendar.
    pub fn new() -> Self {
        let holidays = HolidayRules::new()
            .custom(uk_new_year)
            .easter_offset(-2)
            .easter_offset(1)
            .custom(uk_may_holidays)
            .last_weekday(8, Weekday::Mon)
            .custom(uk_christmas)
            .custom(uk_special)
            .build();
        Self { holidays }
    }

    /// Shared instance.
    pub fn global() -> &'static UKCalendar {
        UK_CALENDAR.get_or_init(UKCalendar::new)
    }
}

impl Default for UKCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar for UKCalendar {
    fn name(&self) -> &'static str {
        "UK Bank Holidays"
    }

    fn is_business_day(&self, date: Date) -> bool {
        weekday_and_not_in(&self.holidays, date)
    }
}

/// New Year's Day substituted to the following Monday.
fn uk_new_year(year: i32) -> Vec<NaiveDate> {
    let day = match NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.weekday()) {
        Some(Weekday::Sat) => 3,
        Some(Weekday::Sun) => 2,
        _ => 1,
    };
    NaiveDate::from_ymd_opt(year, 1, day).into_iter().collect()
}

/// Early May and Spring bank holidays, with the 2020 and 2022 moves.
fn uk_may_holidays(year: i32) -> Vec<NaiveDate> {
    let early = if year == 2020 {
        NaiveDate::from_ymd_opt(2020, 5, 8)
    } else {
        nth_weekday_of_month(year, 5, Weekday::Mon, 1)
    };
    let spring = if year == 2022 {
        NaiveDate::from_ymd_opt(2022, 6, 2)
    } else {
        last_weekday_of_month(year, 5, Weekday::Mon)
    };
    early.into_iter().chain(spring).collect()
}

/// Christmas and Boxing Day with substitute days.
fn uk_christmas(year: i32) -> Vec<NaiveDate> {
    let days: &[u32] = match NaiveDate::from_ymd_opt(year, 12, 25).map(|d| d.weekday()) {
        Some(Weekday::Fri) => &[25, 28],
        Some(Weekday::Sat) => &[27, 28],
        Some(Weekday::Sun) => &[26, 27],
        _ => &[25, 26],
    };
    days.iter()
        .filter_map(|&d| NaiveDate::from_ymd_opt(year, 12, d))
        .collect()
}

/// One-off royal and state occasions.
fn uk_special(year: i32) -> Vec<NaiveDate> {
    let days: &[(u32, u32)] = match year {
        2011 => &[(4, 29)],
        2012 => &[(6, 5)],
        2022 => &[(6, 3), (9, 19)],
        2023 => &[(5, 8)],
        _ => &[],
    };
    days.iter()
        .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .collect()
}

/// TARGET2 settlement calendar. Holidays falling on weekends are not
/// substituted.
#[derive(Debug, Clone)]
pub struct Target2Calendar {
    holidays: HolidayTable,
}

impl Target2Calendar {
    /// Builds the calendar.
    pub fn new() -> Self {
        let holidays = HolidayRules::new()
            .fixed(1, 1, false)
            .easter_offset(-2)
            .easter_offset(1)
            .fixed(5, 1, false)
            .fixed(12, 25, false)
            .fixed(12, 26, false)
            .build();
        Self { holidays }
    }

    /// Shared instance.
    pub fn global() -> &'static Target2Calendar {
        TARGET2_CALENDAR.get_or_init(Target2Calendar::new)
    }
}

impl Default for Target2Calendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar for Target2Calendar {
    fn name(&self) -> &'static str {
        "TARGET2"
    }

    fn is_business_day(&self, date: Date) -> bool {
        weekday_and_not_in(&self.holidays, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_us_holidays_2025() {
        let cal = USCalendar::global();
        assert!(!cal.is_business_day(d(2025, 1, 1)));
        assert!(!cal.is_business_day(d(2025, 1, 20))); // MLK
        assert!(!cal.is_business_day(d(2025, 5, 26))); // Memorial
        assert!(!cal.is_business_day(d(2025, 6, 19))); // Juneteenth
        assert!(!cal.is_business_day(d(2025, 11, 27))); // Thanksgiving
        assert!(cal.is_business_day(d(2025, 11, 28)));
    }

    #[test]
    fn test_us_observed() {
        let cal = USCalendar::global();
        // July 4 2026 is a Saturday, observed Friday
        assert!(!cal.is_business_day(d(2026, 7, 3)));
        // Juneteenth before 2021 is a business day
        assert!(cal.is_business_day(d(2020, 6, 19)));
    }

    #[test]
    fn test_uk_holidays() {
        let cal = UKCalendar::global();
        assert!(!cal.is_business_day(d(2025, 4, 18))); // Good Friday
        assert!(!cal.is_business_day(d(2025, 4, 21))); // Easter Monday
        assert!(!cal.is_business_day(d(2025, 5, 5)));
        assert!(!cal.is_business_day(d(2020, 5, 8)));
        assert!(cal.is_business_day(d(2020, 5, 4)));
        // Christmas 2021 Saturday: 27th and 28th substituted
        assert!(!cal.is_business_day(d(2021, 12, 27)));
        assert!(!cal.is_business_day(d(2021, 12, 28)));
        assert!(!cal.is_business_day(d(2023, 5, 8)));
    }

    #[test]
    fn test_target2() {
        let cal = Target2Calendar::global();
        assert!(!cal.is_business_day(d(2025, 5, 1)));
        assert!(!cal.is_business_day(d(2025, 12, 26)));
        // No substitution: Friday before a Saturday New Year is open
        assert!(cal.is_business_day(d(2027, 12, 31)));
    }
}
