use chrono::prelude::*;
use chrono::Duration;
use chrono_tz::Tz;

/// The local hour at which every reminder fires
pub const DEFAULT_REMINDER_HOUR: u32 = 9;

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> Option<u32> {
    let len = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return None,
    };
    Some(len)
}

/// Longest length the month can have in any year
pub fn get_max_month_length(month: u32) -> Option<u32> {
    // 2000 is a leap year
    get_month_length(2000, month)
}

/// Checks the parts of a gregorian date where every part may be left out.
/// When both `day` and `month` are known the day has to fit into the month,
/// and when the year is known as well the full date has to exist.
pub fn is_valid_partial_date(day: Option<u32>, month: Option<u32>, year: Option<i32>) -> bool {
    if let Some(day) = day {
        if !(1..=31).contains(&day) {
            return false;
        }
    }
    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            return false;
        }
    }
    match (day, month, year) {
        (Some(day), Some(month), Some(year)) => NaiveDate::from_ymd_opt(year, month, day).is_some(),
        (Some(day), Some(month), None) => get_max_month_length(month)
            .map(|len| day <= len)
            .unwrap_or(false),
        _ => true,
    }
}

/// Builds the date, moving a day past the end of the month back onto its last day
/// (e.g. 29th of February in a common year becomes the 28th).
pub fn date_clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let month_length = get_month_length(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, month_length))
}

/// The instant at `hour`:00 local time on `date` in the given timezone.
/// Hours that are skipped by a DST transition resolve to the first valid local time after them.
pub fn at_local_hour(date: NaiveDate, hour: u32, tz: &Tz) -> DateTime<Utc> {
    let mut local = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());
    for _ in 0..4 {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        local += Duration::hours(1);
    }
    Utc.from_utc_datetime(&local)
}

pub fn local_date(ts: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    ts.with_timezone(tz).date_naive()
}

pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|ts| ts.with_nanosecond(0))
        .unwrap_or(ts)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_accepts_valid_dates() {
        let valid_dates = vec![
            (Some(1), Some(1), Some(2018)),
            (Some(31), Some(12), Some(2025)),
            (Some(29), Some(2), Some(2020)),
            (Some(29), Some(2), None),
            (Some(5), None, None),
            (None, Some(7), None),
            (None, None, Some(1999)),
            (None, None, None),
        ];

        for (day, month, year) in valid_dates {
            assert!(is_valid_partial_date(day, month, year));
        }
    }

    #[test]
    fn it_rejects_invalid_dates() {
        let invalid_dates = vec![
            (Some(32), Some(1), Some(2020)),
            (Some(30), Some(2), Some(2020)),
            (Some(29), Some(2), Some(2021)),
            (Some(1), Some(0), Some(2020)),
            (Some(0), Some(1), Some(2020)),
            (Some(31), Some(4), None),
            (None, Some(13), None),
        ];

        for (day, month, year) in invalid_dates {
            assert!(!is_valid_partial_date(day, month, year));
        }
    }

    #[test]
    fn it_clamps_dates_into_the_month() {
        assert_eq!(
            date_clamped(2021, 2, 29),
            NaiveDate::from_ymd_opt(2021, 2, 28)
        );
        assert_eq!(
            date_clamped(2024, 2, 29),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(date_clamped(2024, 13, 1), None);
    }

    #[test]
    fn it_resolves_local_hours() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert_eq!(
            at_local_hour(date, 9, &chrono_tz::UTC),
            Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap()
        );
        // Oslo is UTC+2 in summer
        assert_eq!(
            at_local_hour(date, 9, &chrono_tz::Europe::Oslo),
            Utc.with_ymd_and_hms(2026, 7, 1, 7, 0, 0).unwrap()
        );
        // 02:00 does not exist in Oslo on the last Sunday of March
        let gap = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap();
        assert_eq!(
            at_local_hour(gap, 2, &chrono_tz::Europe::Oslo),
            Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn it_truncates_to_minutes() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 5, 9, 0, 42).unwrap() + Duration::milliseconds(7);
        assert_eq!(
            truncate_to_minute(ts),
            Utc.with_ymd_and_hms(2026, 2, 5, 9, 0, 0).unwrap()
        );
    }
}
