mod gregorian;
mod lunar;

use chrono::NaiveDate;
pub use gregorian::GregorianCalendar;
pub use lunar::LunarCalendar;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display, sync::Arc};
use thiserror::Error;

pub const GREGORIAN: &str = "gregorian";

/// A day in some calendar system, addressed the way that calendar counts days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl CalendarDate {
    pub fn new(day: u32, month: u32, year: i32) -> Self {
        Self { day, month, year }
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error("{date} is not a valid date in the {calendar} calendar")]
    InvalidDate {
        calendar: String,
        date: CalendarDate,
    },
    #[error("{date} is outside of the range supported by the {calendar} calendar")]
    OutOfRange { calendar: String, date: String },
    #[error("Calendar type: {0} is not supported")]
    Unsupported(String),
    #[error("No occurrence of {month}-{day} found after {after}")]
    NoOccurrence {
        day: u32,
        month: u32,
        after: NaiveDate,
    },
}

/// Maps dates between a calendar system and the gregorian calendar.
///
/// Converters are pure and are shared between the authoring code and the dispatcher.
pub trait CalendarConverter: Send + Sync {
    fn name(&self) -> &str;

    fn to_gregorian(&self, date: CalendarDate) -> Result<NaiveDate, CalendarError>;

    /// Must be the left inverse of `to_gregorian` for every valid date
    fn from_gregorian(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError>;

    /// The gregorian date of the `month`/`day` anniversary in the given calendar year.
    /// Unlike `to_gregorian` this accepts a day that does not exist in that particular
    /// year and uses the closest earlier day of the month instead.
    fn anniversary(&self, day: u32, month: u32, year: i32) -> Result<NaiveDate, CalendarError> {
        self.to_gregorian(CalendarDate::new(day, month, year))
    }

    /// First gregorian date of the `month`/`day` anniversary strictly after `after`.
    ///
    /// `hint_year` pins the first candidate to an explicit year in this calendar. It is only
    /// meant for the first schedule of a dated reminder, recurrences pass `None`.
    fn next_occurrence(
        &self,
        day: u32,
        month: u32,
        hint_year: Option<i32>,
        after: NaiveDate,
    ) -> Result<NaiveDate, CalendarError> {
        if let Some(year) = hint_year {
            if let Ok(date) = self.anniversary(day, month, year) {
                if date > after {
                    return Ok(date);
                }
            }
        }

        let year = self.from_gregorian(after)?.year;
        let mut last_error = None;
        for candidate_year in [year, year + 1] {
            match self.anniversary(day, month, candidate_year) {
                Ok(date) if date > after => return Ok(date),
                Ok(_) => {}
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(CalendarError::NoOccurrence { day, month, after }))
    }
}

/// Named calendar converters.
///
/// The registry is built once at startup and then only read. `gregorian` is always present.
#[derive(Clone)]
pub struct CalendarRegistry {
    converters: HashMap<String, Arc<dyn CalendarConverter>>,
}

impl CalendarRegistry {
    /// A registry that only knows the gregorian calendar
    pub fn new() -> Self {
        let mut converters: HashMap<String, Arc<dyn CalendarConverter>> = HashMap::new();
        converters.insert(GREGORIAN.into(), Arc::new(GregorianCalendar));
        Self { converters }
    }

    pub fn with_converter(self, converter: Arc<dyn CalendarConverter>) -> Self {
        let name = converter.name().to_lowercase();
        self.with_alias(&name, converter)
    }

    pub fn with_alias(mut self, name: &str, converter: Arc<dyn CalendarConverter>) -> Self {
        self.converters.insert(name.to_lowercase(), converter);
        self
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn CalendarConverter>, CalendarError> {
        let name = name.trim().to_lowercase();
        self.converters
            .get(&name)
            .cloned()
            .ok_or(CalendarError::Unsupported(name))
    }

    pub fn is_gregorian(name: &str) -> bool {
        let name = name.trim();
        name.is_empty() || name.eq_ignore_ascii_case(GREGORIAN)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = self.converters.keys().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

impl Default for CalendarRegistry {
    fn default() -> Self {
        let lunar = Arc::new(LunarCalendar);
        Self::new()
            .with_converter(lunar.clone())
            .with_alias("chinese", lunar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Calendar that is shifted by ten days from the gregorian calendar, only used
    /// to check that the registry accepts new converters
    struct ShiftedCalendar;

    impl CalendarConverter for ShiftedCalendar {
        fn name(&self) -> &str {
            "Shifted"
        }

        fn to_gregorian(&self, date: CalendarDate) -> Result<NaiveDate, CalendarError> {
            NaiveDate::from_ymd_opt(date.year, date.month, date.day)
                .map(|d| d + chrono::Duration::days(10))
                .ok_or(CalendarError::InvalidDate {
                    calendar: self.name().into(),
                    date,
                })
        }

        fn from_gregorian(&self, date: NaiveDate) -> Result<CalendarDate, CalendarError> {
            GregorianCalendar.from_gregorian(date - chrono::Duration::days(10))
        }
    }

    #[test]
    fn it_always_knows_the_gregorian_calendar() {
        let registry = CalendarRegistry::new();
        assert!(registry.lookup("gregorian").is_ok());
        assert!(registry.lookup("Gregorian").is_ok());
        assert_eq!(
            registry.lookup("lunar").err(),
            Some(CalendarError::Unsupported("lunar".into()))
        );
    }

    #[test]
    fn default_registry_contains_lunar_calendar() {
        let registry = CalendarRegistry::default();
        assert_eq!(registry.names(), vec!["chinese", "gregorian", "lunar"]);
        assert_eq!(registry.lookup("LUNAR").unwrap().name(), "lunar");
    }

    #[test]
    fn it_registers_extra_converters() {
        let registry = CalendarRegistry::new().with_converter(Arc::new(ShiftedCalendar));
        let converter = registry.lookup("shifted").expect("Converter to be registered");
        let after = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            converter.next_occurrence(5, 3, None, after),
            Ok(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())
        );
    }

    #[test]
    fn next_occurrence_uses_hint_year_only_when_in_the_future() {
        let gregorian = GregorianCalendar;
        let after = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        assert_eq!(
            gregorian.next_occurrence(5, 2, Some(2030), after),
            Ok(NaiveDate::from_ymd_opt(2030, 2, 5).unwrap())
        );
        assert_eq!(
            gregorian.next_occurrence(5, 2, Some(2001), after),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 5).unwrap())
        );
    }

    #[test]
    fn is_gregorian_accepts_empty_names() {
        assert!(CalendarRegistry::is_gregorian(""));
        assert!(CalendarRegistry::is_gregorian(" GREGORIAN "));
        assert!(!CalendarRegistry::is_gregorian("lunar"));
    }
}
