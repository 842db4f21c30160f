use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use proptest::prelude::*;
use turnos_core::validation::{
    age_on, appointment_time, birth_date, insurance_code, name, ValidationContext,
};
use turnos_core::wizard::{check_date, DateRejection};
use turnos_core::ClinicConfig;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (-400i64..800).prop_map(|offset| today() + Duration::days(offset))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn weekends_and_past_days_never_bookable(date in any_date()) {
        let config = ClinicConfig::default();
        let result = check_date(date, today(), &config);
        if date < today() {
            prop_assert_eq!(result, Err(DateRejection::Past));
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            prop_assert_eq!(result, Err(DateRejection::Weekend));
        } else if date.month() == 9 && date.day() == 15 {
            prop_assert_eq!(result, Err(DateRejection::Blackout));
        } else {
            prop_assert_eq!(result, Ok(()));
        }
    }

    #[test]
    fn times_accepted_only_on_grid(hour in 0u32..24, minute in 0u32..60) {
        let input = format!("{hour:02}:{minute:02}");
        let total = hour * 60 + minute;
        let expected = (8 * 60..=18 * 60).contains(&total) && minute % 30 == 0;
        prop_assert_eq!(appointment_time(&input).is_ok(), expected);
    }

    #[test]
    fn age_boundary_is_sixteenth_birthday(offset in 0i64..3) {
        let ctx = ValidationContext::new(today());
        let sixteenth = today() - Months::new(16 * 12);
        // One day short of sixteen fails, the birthday itself and earlier pass.
        let too_young = sixteenth + Duration::days(1 + offset);
        let old_enough = sixteenth - Duration::days(offset);
        prop_assert!(birth_date(&too_young.to_string(), &ctx).is_err());
        prop_assert!(birth_date(&old_enough.to_string(), &ctx).is_ok());
        prop_assert_eq!(age_on(old_enough, today()), 16);
    }

    #[test]
    fn name_normalization_is_idempotent(raw in "[a-záéíóúñ]{2,10}( [a-záéíóúñ]{2,10}){0,2}") {
        let once = name(&raw).unwrap();
        prop_assert_eq!(name(&once).unwrap(), once.clone());
        prop_assert!(once.split(' ').all(|w| w.chars().next().map_or(false, char::is_uppercase)));
    }

    #[test]
    fn insurance_codes_uppercased(raw in "[a-z0-9]{2,10}") {
        prop_assert_eq!(insurance_code(&raw).unwrap(), raw.to_uppercase());
    }
}

#[test]
fn test_documented_normalizations() {
    assert_eq!(name("maría lopez").unwrap(), "María Lopez");
    assert_eq!(insurance_code("osde1").unwrap(), "OSDE1");
    assert_eq!(appointment_time("9:30").unwrap(), "09:30");
    assert_eq!(
        appointment_time("09:15").unwrap_err(),
        "Times must fall on 30-minute intervals (e.g. 09:00, 09:30)"
    );
    assert_eq!(
        appointment_time("18:30").unwrap_err(),
        "Office hours are 08:00 to 18:00"
    );
}
