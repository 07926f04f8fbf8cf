//! China interbank market calendar.

use std::sync::OnceLock;

use super::holidays::{HolidayRules, HolidayTable};
use super::Calendar;
use crate::types::Date;

static CHINA_IB_CALENDAR: OnceLock<ChinaInterbankCalendar> = OnceLock::new();

type DayRange = ((i32, u32, u32), (i32, u32, u32));

/// Published public holiday closures of the China interbank market.
///
/// Weekend make-up working days are not modelled: weekends are always
/// closed.
const CLOSURES: &[DayRange] = &[
    // 2019
    ((2019, 1, 1), (2019, 1, 1)),
    ((2019, 2, 4), (2019, 2, 10)),
    ((2019, 4, 5), (2019, 4, 5)),
    ((2019, 5, 1), (2019, 5, 4)),
    ((2019, 6, 7), (2019, 6, 7)),
    ((2019, 9, 13), (2019, 9, 13)),
    ((2019, 10, 1), (2019, 10, 7)),
    // 2020
    ((2020, 1, 1), (2020, 1, 1)),
    ((2020, 1, 24), (2020, 2, 2)),
    ((2020, 4, 4), (2020, 4, 6)),
    ((2020, 5, 1), (2020, 5, 5)),
    ((2020, 6, 25), (2020, 6, 27)),
    ((2020, 10, 1), (2020, 10, 8)),
    // 2021
    ((2021, 1, 1), (2021, 1, 3)),
    ((2021, 2, 11), (2021, 2, 17)),
    ((2021, 4, 3), (2021, 4, 5)),
    ((2021, 5, 1), (2021, 5, 5)),
    ((2021, 6, 12), (2021, 6, 14)),
    ((2021, 9, 19), (2021, 9, 21)),
    ((2021, 10, 1), (2021, 10, 7)),
    // 2022
    ((2022, 1, 1), (2022, 1, 3)),
    ((2022, 1, 31), (2022, 2, 6)),
    ((2022, 4, 3), (2022, 4, 5)),
    ((2022, 4, 30), (2022, 5, 4)),
    ((2022, 6, 3), (2022, 6, 5)),
    ((2022, 9, 10), (2022, 9, 12)),
    ((2022, 10, 1), (2022, 10, 7)),
    // 2023
    ((2022, 12, 31), (2023, 1, 2)),
    ((2023, 1, 21), (2023, 1, 27)),
    ((2023, 4, 5), (2023, 4, 5)),
    ((2023, 4, 29), (2023, 5, 3)),
    ((2023, 6, 22), (2023, 6, 24)),
    ((2023, 9, 29), (2023, 10, 6)),
    // 2024
    ((2024, 1, 1), (2024, 1, 1)),
    ((2024, 2, 10), (2024, 2, 17)),
    ((2024, 4, 4), (2024, 4, 6)),
    ((2024, 5, 1), (2024, 5, 5)),
    ((2024, 6, 10), (2024, 6, 10)),
    ((2024, 9, 15), (2024, 9, 17)),
    ((2024, 10, 1), (2024, 10, 7)),
    // 2025
    ((2025, 1, 1), (2025, 1, 1)),
    ((2025, 1, 28), (2025, 2, 4)),
    ((2025, 4, 4), (2025, 4, 6)),
    ((2025, 5, 1), (2025, 5, 5)),
    ((2025, 5, 31), (2025, 6, 2)),
    ((2025, 10, 1), (2025, 10, 8)),
];

/// China interbank (CFETS) calendar with an embedded closure table.
///
/// Years outside the table fall back to New Year's Day, Labour Day and
/// the National Day week.
#[derive(Debug, Clone)]
pub struct ChinaInterbankCalendar {
    holidays: HolidayTable,
}

impl ChinaInterbankCalendar {
    /// Builds the calendar.
    pub fn new() -> Self {
        let holidays = HolidayRules::new()
            .ranges(CLOSURES)
            .custom(|year| {
                if (2019..=2025).contains(&year) {
                    return Vec::new();
                }
                let mut days: Vec<_> = [(1, 1), (5, 1)]
                    .iter()
                    .filter_map(|&(m, d)| chrono::NaiveDate::from_ymd_opt(year, m, d))
                    .collect();
                days.extend((1..=7).filter_map(|d| chrono::NaiveDate::from_ymd_opt(year, 10, d)));
                days
            })
            .build();
        Self { holidays }
    }

    /// Shared instance.
    pub fn global() -> &'static ChinaInterbankCalendar {
        CHINA_IB_CALENDAR.get_or_init(ChinaInterbankCalendar::new)
    }
}

impl Default for ChinaInterbankCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl Calendar for ChinaInterbankCalendar {
    fn name(&self) -> &'static str {
        "China Interbank"
    }

    fn is_business_day(&self, date: Date) -> bool {
        date.is_weekday() && !self.holidays.contains(date.as_naive_date())
    }
}
