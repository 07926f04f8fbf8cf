//! Property-based tests for date arithmetic, day counts and schedules.

use proptest::prelude::*;
use strike_core::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

fn date_strategy() -> impl Strategy<Value = Date> {
    (1990i32..2080i32, 1u32..13u32, 1u32..32u32)
        .prop_filter_map("valid date", |(y, m, d)| Date::from_ymd(y, m, d).ok())
}

fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Annual),
        Just(Frequency::SemiAnnual),
        Just(Frequency::Quarterly),
        Just(Frequency::Monthly),
    ]
}

fn calendar_strategy() -> impl Strategy<Value = CalendarType> {
    prop_oneof![
        Just(CalendarType::Weekend),
        Just(CalendarType::UnitedStates),
        Just(CalendarType::UnitedKingdom),
        Just(CalendarType::Target),
        Just(CalendarType::ChinaIb),
    ]
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn serial_roundtrip(date in date_strategy()) {
        prop_assert_eq!(Date::from_serial(date.serial()).unwrap(), date);
    }

    #[test]
    fn add_months_stays_in_target_month(date in date_strategy(), months in -120i32..120) {
        let shifted = date.add_months(months).unwrap();
        let total = date.year() * 12 + date.month() as i32 - 1 + months;
        prop_assert_eq!(shifted.year(), total.div_euclid(12));
        prop_assert_eq!(shifted.month() as i32, total.rem_euclid(12) + 1);
        prop_assert!(shifted.day() <= date.day());
    }

    #[test]
    fn year_fraction_is_antisymmetric(a in date_strategy(), b in date_strategy()) {
        for dc in [
            DayCountType::Act365F,
            DayCountType::Act360,
            DayCountType::ActActIsda,
            DayCountType::ThirtyE360,
            DayCountType::Thirty360Bond,
        ] {
            let fwd = dc.year_frac(a, b, None, None).unwrap().alpha;
            let back = dc.year_frac(b, a, None, None).unwrap().alpha;
            prop_assert!((fwd + back).abs() < 1e-12);
        }
        if a < b {
            prop_assert!(DayCountType::Act360.year_frac(a, b, None, None).unwrap().alpha > 0.0);
        }
    }

    #[test]
    fn act_act_isda_bounded_by_act_365_variants(a in date_strategy(), b in date_strategy()) {
        prop_assume!(a < b);
        let isda = DayCountType::ActActIsda.year_frac(a, b, None, None).unwrap().alpha;
        let days = a.days_between(&b) as f64;
        prop_assert!(isda <= days / 365.0 + 1e-12);
        prop_assert!(isda >= days / 366.0 - 1e-12);
    }

    #[test]
    fn schedule_is_strictly_increasing(
        start in date_strategy(),
        months in 1i32..240,
        freq in frequency_strategy(),
        calendar in calendar_strategy(),
        forward in any::<bool>(),
    ) {
        let maturity = start.add_months(months).unwrap();
        prop_assume!(maturity > start);
        let rule = if forward { DateGenRule::Forward } else { DateGenRule::Backward };
        let schedule = Schedule::generate(
            start,
            maturity,
            freq,
            calendar,
            BusinessDayConvention::ModifiedFollowing,
            rule,
        )
        .unwrap();
        let dates = schedule.dates();
        prop_assert!(dates.len() >= 2);
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(dates[0], calendar.adjust(start, BusinessDayConvention::ModifiedFollowing));
        prop_assert_eq!(
            *dates.last().unwrap(),
            calendar.adjust(maturity, BusinessDayConvention::ModifiedFollowing)
        );
    }

    #[test]
    fn adjusted_dates_are_business_days(date in date_strategy(), calendar in calendar_strategy()) {
        for convention in [
            BusinessDayConvention::Following,
            BusinessDayConvention::ModifiedFollowing,
            BusinessDayConvention::Preceding,
            BusinessDayConvention::ModifiedPreceding,
            BusinessDayConvention::Nearest,
        ] {
            let adjusted = calendar.adjust(date, convention);
            prop_assert!(calendar.is_business_day(adjusted));
            if matches!(convention, BusinessDayConvention::ModifiedFollowing | BusinessDayConvention::ModifiedPreceding) {
                prop_assert_eq!(adjusted.month(), date.month());
            }
        }
    }
}

// =============================================================================
// FIXED EXAMPLES
// =============================================================================

#[test]
fn invalid_calendar_dates_are_rejected() {
    assert!(Date::from_ymd(2019, 13, 1).is_err());
    assert!(Date::from_ymd(2019, 1, 32).is_err());
    assert!(Date::from_ymd(2019, 2, 29).is_err());
    assert!(Date::from_ymd(2020, 2, 29).is_ok());
    let err = Date::from_ymd(2019, 13, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);
}

#[test]
fn tenor_arithmetic() {
    let d = Date::from_ymd(2019, 1, 31).unwrap();
    assert_eq!(d.add_tenor_str("1M").unwrap(), Date::from_ymd(2019, 2, 28).unwrap());
    assert_eq!(d.add_tenor_str("2W").unwrap(), Date::from_ymd(2019, 2, 14).unwrap());
    assert_eq!(d.add_tenor_str("1Y").unwrap(), Date::from_ymd(2020, 1, 31).unwrap());
    assert_eq!(d.add_tenor_str("ON").unwrap(), Date::from_ymd(2019, 2, 1).unwrap());
    assert!(d.add_tenor_str("1X").is_err());
}

#[test]
fn add_weekdays_skips_weekends() {
    let friday = Date::from_ymd(2019, 1, 4).unwrap();
    assert_eq!(friday.add_weekdays(1), Date::from_ymd(2019, 1, 7).unwrap());
    assert_eq!(friday.add_weekdays(5), Date::from_ymd(2019, 1, 11).unwrap());
    assert_eq!(
        Date::from_ymd(2019, 1, 7).unwrap().add_weekdays(-1),
        friday
    );
}
