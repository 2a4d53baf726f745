use super::{CalendarConverter, CalendarDate, CalendarError, GREGORIAN};
use crate::date::date_clamped;
use chrono::{Datelike, NaiveDate};

/// The identity converter
#[derive(Debug, Clone, Copy, Default)]
pub struct GregorianCalendar;

impl CalendarConverter for GregorianCalendar {
    fn name(&self) -> &str {
        GREGORIAN
    }

    fn to_gregorian(&self, date: CalendarDate) -> Result<NaiveDate, CalendarError> {
        NaiveDate::from_ymd_opt(date.year, date.month, date.day).ok_or_else(|| {
            CalendarError::InvalidDate {
                calendar: GREGORIAN.into(),
                date,
            }
        })
    }

    fn from_gregorian(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError> {
        Ok(CalendarDate::new(date.day(), date.month(), date.year()))
    }

    fn anniversary(&self, day: u32, month: u32, year: i32) -> Result<NaiveDate, CalendarError> {
        if !(1..=31).contains(&day) {
            return Err(CalendarError::InvalidDate {
                calendar: GREGORIAN.into(),
                date: CalendarDate::new(day, month, year),
            });
        }
        date_clamped(year, month, day).ok_or_else(|| CalendarError::InvalidDate {
            calendar: GREGORIAN.into(),
            date: CalendarDate::new(day, month, year),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn it_is_the_identity() {
        let d = CalendarDate::new(5, 2, 2026);
        assert_eq!(GregorianCalendar.to_gregorian(d), Ok(date(2026, 2, 5)));
        assert_eq!(GregorianCalendar.from_gregorian(date(2026, 2, 5)), Ok(d));
    }

    #[test]
    fn it_rejects_invalid_dates() {
        assert!(GregorianCalendar
            .to_gregorian(CalendarDate::new(30, 2, 2026))
            .is_err());
        assert!(GregorianCalendar.anniversary(0, 2, 2026).is_err());
        assert!(GregorianCalendar.anniversary(1, 13, 2026).is_err());
    }

    #[test]
    fn leap_day_anniversaries_fall_on_the_last_day_of_february() {
        let after = date(2026, 1, 1);
        assert_eq!(
            GregorianCalendar.next_occurrence(29, 2, None, after),
            Ok(date(2026, 2, 28))
        );
        assert_eq!(
            GregorianCalendar.next_occurrence(29, 2, None, date(2027, 12, 31)),
            Ok(date(2028, 2, 29))
        );
    }

    #[test]
    fn next_occurrence_is_strictly_after() {
        assert_eq!(
            GregorianCalendar.next_occurrence(5, 2, None, date(2026, 2, 5)),
            Ok(date(2027, 2, 5))
        );
        assert_eq!(
            GregorianCalendar.next_occurrence(5, 2, None, date(2026, 2, 4)),
            Ok(date(2026, 2, 5))
        );
    }
}
