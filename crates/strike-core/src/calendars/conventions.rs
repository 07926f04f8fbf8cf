//! Rolling rules for dates that land on holidays or weekends.

use serde::{Deserialize, Serialize};

use super::Calendar;
use crate::types::Date;

/// Rolling rule applied to a non-business date.
///
/// The modified rules stay inside the calendar month of the original date:
/// when the plain roll would leave the month they roll the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessDayConvention {
    /// Leave the date alone.
    #[serde(alias = "NONE")]
    Unadjusted,
    /// Next good day.
    #[default]
    Following,
    /// Next good day within the month.
    ModifiedFollowing,
    /// Previous good day.
    Preceding,
    /// Previous good day within the month.
    ModifiedPreceding,
    /// Closer of the two neighbouring good days, later one on a tie.
    Nearest,
}

impl BusinessDayConvention {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unadjusted => "Unadjusted",
            Self::Following => "Following",
            Self::ModifiedFollowing => "Modified Following",
            Self::Preceding => "Preceding",
            Self::ModifiedPreceding => "Modified Preceding",
            Self::Nearest => "Nearest",
        }
    }

    /// Rolls `date` onto a business day of `calendar`. Business days are
    /// returned unchanged.
    pub fn apply<C: Calendar + ?Sized>(self, date: Date, calendar: &C) -> Date {
        if calendar.is_business_day(date) {
            return date;
        }
        let later = || roll(date, calendar, 1);
        let earlier = || roll(date, calendar, -1);
        match self {
            Self::Unadjusted => date,
            Self::Following => later(),
            Self::Preceding => earlier(),
            Self::ModifiedFollowing => {
                let rolled = later();
                if rolled.month() == date.month() {
                    rolled
                } else {
                    earlier()
                }
            }
            Self::ModifiedPreceding => {
                let rolled = earlier();
                if rolled.month() == date.month() {
                    rolled
                } else {
                    later()
                }
            }
            Self::Nearest => {
                let (up, down) = (later(), earlier());
                if date.days_between(&up) <= down.days_between(&date) {
                    up
                } else {
                    down
                }
            }
        }
    }
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Free-function form of [`BusinessDayConvention::apply`].
pub fn adjust<C: Calendar + ?Sized>(date: Date, convention: BusinessDayConvention, calendar: &C) -> Date {
    convention.apply(date, calendar)
}

/// First business day reached by stepping `step` days at a time.
fn roll<C: Calendar + ?Sized>(mut date: Date, calendar: &C, step: i64) -> Date {
    while !calendar.is_business_day(date) {
        date = date.add_days(step);
    }
    date
}
