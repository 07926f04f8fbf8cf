//! Holiday tables with constant-time lookup.
//!
//! Holidays are generated once per calendar from rules (fixed dates,
//! nth weekdays, Easter offsets, explicit date ranges) and stored as one
//! bit per day of year.

use chrono::{Datelike, NaiveDate, Weekday};

/// First year covered by generated holiday tables.
pub const MIN_YEAR: i32 = 1970;
/// Last year covered by generated holiday tables.
pub const MAX_YEAR: i32 = 2100;

const YEAR_COUNT: usize = (MAX_YEAR - MIN_YEAR + 1) as usize;
const WORDS_PER_YEAR: usize = 6; // 366 bits

/// Bitset of holidays, indexed by year and ordinal day.
#[derive(Clone)]
pub struct HolidayTable {
    bits: Vec<[u64; WORDS_PER_YEAR]>,
}

impl std::fmt::Debug for HolidayTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolidayTable")
            .field("holidays", &self.len())
            .finish()
    }
}

impl HolidayTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            bits: vec![[0u64; WORDS_PER_YEAR]; YEAR_COUNT],
        }
    }

    fn index(date: NaiveDate) -> Option<(usize, usize, u32)> {
        let year = date.year();
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        let ordinal = date.ordinal0() as usize;
        Some(((year - MIN_YEAR) as usize, ordinal / 64, (ordinal % 64) as u32))
    }

    /// Marks a date as a holiday. Dates outside the covered years are ignored.
    pub fn insert(&mut self, date: NaiveDate) {
        if let Some((y, w, b)) = Self::index(date) {
            self.bits[y][w] |= 1u64 << b;
        }
    }

    /// Returns true if the date is a holiday.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        match Self::index(date) {
            Some((y, w, b)) => self.bits[y][w] & (1u64 << b) != 0,
            None => false,
        }
    }

    /// Number of holidays stored.
    pub fn len(&self) -> usize {
        self.bits
            .iter()
            .flat_map(|year| year.iter())
            .map(|w| w.count_ones() as usize)
            .sum()
    }

    /// Returns true if no holiday is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HolidayTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Rule-based builder for a [`HolidayTable`].
#[derive(Debug, Default)]
pub struct HolidayRules {
    table: HolidayTable,
}

impl HolidayRules {
    /// Starts an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same month and day every year, optionally moved off the weekend
    /// (Saturday to Friday, Sunday to Monday).
    #[must_use]
    pub fn fixed(mut self, month: u32, day: u32, observed: bool) -> Self {
        self.fixed_between(month, day, MIN_YEAR, MAX_YEAR, observed);
        self
    }

    /// Fixed holiday observed only from `from_year` onwards.
    #[must_use]
    pub fn fixed_from(mut self, month: u32, day: u32, from_year: i32, observed: bool) -> Self {
        self.fixed_between(month, day, from_year, MAX_YEAR, observed);
        self
    }

    fn fixed_between(&mut self, month: u32, day: u32, from: i32, to: i32, observed: bool) {
        for year in from.max(MIN_YEAR)..=to.min(MAX_YEAR) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let date = if observed {
                    observed_date(date)
                } else {
                    date
                };
                self.table.insert(date);
            }
        }
    }

    /// The `n`-th given weekday of a month, every year.
    #[must_use]
    pub fn nth_weekday(mut self, month: u32, weekday: Weekday, n: u32) -> Self {
        for year in MIN_YEAR..=MAX_YEAR {
            if let Some(date) = nth_weekday_of_month(year, month, weekday, n) {
                self.table.insert(date);
            }
        }
        self
    }

    /// The last given weekday of a month, every year.
    #[must_use]
    pub fn last_weekday(mut self, month: u32, weekday: Weekday) -> Self {
        for year in MIN_YEAR..=MAX_YEAR {
            if let Some(date) = last_weekday_of_month(year, month, weekday) {
                self.table.insert(date);
            }
        }
        self
    }

    /// A day at `offset` days from Easter Sunday, every year.
    #[must_use]
    pub fn easter_offset(mut self, offset: i64) -> Self {
        for year in MIN_YEAR..=MAX_YEAR {
            if let Some(date) = easter_sunday(year)
                .and_then(|e| e.checked_add_signed(chrono::Duration::days(offset)))
            {
                self.table.insert(date);
            }
        }
        self
    }

    /// Holidays produced by a per-year generator.
    #[must_use]
    pub fn custom<F>(mut self, generator: F) -> Self
    where
        F: Fn(i32) -> Vec<NaiveDate>,
    {
        for year in MIN_YEAR..=MAX_YEAR {
            for date in generator(year) {
                self.table.insert(date);
            }
        }
        self
    }

    /// Every day of each inclusive `(year, month, day)` range.
    #[must_use]
    pub fn ranges(mut self, ranges: &[((i32, u32, u32), (i32, u32, u32))]) -> Self {
        for &((y0, m0, d0), (y1, m1, d1)) in ranges {
            let (Some(start), Some(end)) = (
                NaiveDate::from_ymd_opt(y0, m0, d0),
                NaiveDate::from_ymd_opt(y1, m1, d1),
            ) else {
                continue;
            };
            let mut day = start;
            while day <= end {
                self.table.insert(day);
                match day.succ_opt() {
                    Some(next) => day = next,
                    None => break,
                }
            }
        }
        self
    }

    /// Finishes the table.
    pub fn build(self) -> HolidayTable {
        self.table
    }
}

/// Moves a Saturday holiday to Friday and a Sunday holiday to Monday.
pub fn observed_date(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date.pred_opt().unwrap_or(date),
        Weekday::Sun => date.succ_opt().unwrap_or(date),
        _ => date,
    }
}

/// The `n`-th occurrence of `weekday` in a month (1-based).
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    if n == 0 {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (weekday.num_days_from_monday() as i32
        - first.weekday().num_days_from_monday() as i32)
        .rem_euclid(7) as u32;
    NaiveDate::from_ymd_opt(year, month, 1 + offset + (n - 1) * 7)
}

/// The last occurrence of `weekday` in a month.
pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()?;
    let back = (last.weekday().num_days_from_monday() as i32
        - weekday.num_days_from_monday() as i32)
        .rem_euclid(7);
    last.checked_sub_signed(chrono::Duration::days(i64::from(back)))
}

/// Easter Sunday by the anonymous Gregorian computus.
#[allow(clippy::many_single_char_names)]
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_easter() {
        assert_eq!(easter_sunday(2019).unwrap(), d(2019, 4, 21));
        assert_eq!(easter_sunday(2024).unwrap(), d(2024, 3, 31));
        assert_eq!(easter_sunday(2025).unwrap(), d(2025, 4, 20));
    }

    #[test]
    fn test_nth_and_last_weekday() {
        assert_eq!(
            nth_weekday_of_month(2025, 1, Weekday::Mon, 3).unwrap(),
            d(2025, 1, 20)
        );
        assert_eq!(
            last_weekday_of_month(2025, 5, Weekday::Mon).unwrap(),
            d(2025, 5, 26)
        );
        assert!(nth_weekday_of_month(2025, 1, Weekday::Mon, 0).is_none());
    }

    #[test]
    fn test_observed() {
        assert_eq!(observed_date(d(2026, 7, 4)), d(2026, 7, 3));
        assert_eq!(observed_date(d(2027, 7, 4)), d(2027, 7, 5));
    }

    #[test]
    fn test_rules_and_ranges() {
        let table = HolidayRules::new()
            .fixed(1, 1, false)
            .ranges(&[((2020, 1, 24), (2020, 2, 2))])
            .build();
        assert!(table.contains(d(2031, 1, 1)));
        assert!(table.contains(d(2020, 1, 30)));
        assert!(!table.contains(d(2020, 2, 3)));
        assert!(!table.contains(d(1900, 1, 1)));
    }
}
