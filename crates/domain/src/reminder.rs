use crate::{
    calendar::{CalendarDate, CalendarError, CalendarRegistry, GREGORIAN},
    date::{at_local_hour, date_clamped, local_date, DEFAULT_REMINDER_HOUR},
    shared::entity::{Entity, ID},
};
use chrono::{prelude::*, Duration, Months};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub const DEFAULT_FREQUENCY: u32 = 1;
/// Largest number of weeks, months or years between two occurrences
pub const MAX_FREQUENCY: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    OneTime,
    RecurringWeek,
    RecurringMonth,
    RecurringYear,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::RecurringWeek => "recurring_week",
            Self::RecurringMonth => "recurring_month",
            Self::RecurringYear => "recurring_year",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Self::OneTime)
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Reminder type: {0} is not valid")]
pub struct InvalidReminderTypeError(String);

impl FromStr for ReminderType {
    type Err = InvalidReminderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(Self::OneTime),
            "recurring_week" => Ok(Self::RecurringWeek),
            "recurring_month" => Ok(Self::RecurringMonth),
            "recurring_year" => Ok(Self::RecurringYear),
            _ => Err(InvalidReminderTypeError(s.to_string())),
        }
    }
}

/// The calendar a date was entered in together with the date as the user entered it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarInput {
    pub calendar_type: Option<String>,
    pub original_day: Option<u32>,
    pub original_month: Option<u32>,
    pub original_year: Option<i32>,
}

/// What happened when the calendar fields of a `Reminder` were normalized
#[derive(Debug, PartialEq)]
pub enum CalendarNormalization {
    Gregorian,
    /// The calendar type is unknown and the `Reminder` was stored as gregorian
    Unsupported(CalendarError),
    /// Original day or month is missing so no gregorian anchor could be derived
    MissingOriginalDate,
    Converted,
    /// The original date does not exist in its calendar, gregorian fields were kept
    ConversionFailed(CalendarError),
}

/// A `Reminder` is a one time or repeating event attached to a `Contact`.
///
/// `day`, `month` and `year` always hold the gregorian anchor. When the reminder was entered
/// in another calendar the `original_*` fields keep the date as the user entered it and
/// the gregorian fields are derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    pub contact_id: ID,
    /// Set when the `Reminder` was created from an `ImportantDate`
    pub important_date_id: Option<ID>,
    pub label: String,
    pub day: Option<u32>,
    pub month: Option<u32>,
    /// When missing the reminder is year agnostic
    pub year: Option<i32>,
    pub calendar_type: String,
    pub original_day: Option<u32>,
    pub original_month: Option<u32>,
    pub original_year: Option<i32>,
    pub reminder_type: ReminderType,
    pub frequency_number: u32,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub number_times_triggered: i64,
}

impl Reminder {
    pub fn new(contact_id: ID, label: String, reminder_type: ReminderType) -> Self {
        Self {
            id: Default::default(),
            contact_id,
            important_date_id: None,
            label,
            day: None,
            month: None,
            year: None,
            calendar_type: GREGORIAN.into(),
            original_day: None,
            original_month: None,
            original_year: None,
            reminder_type,
            frequency_number: DEFAULT_FREQUENCY,
            last_triggered_at: None,
            number_times_triggered: 0,
        }
    }

    pub fn is_gregorian(&self) -> bool {
        CalendarRegistry::is_gregorian(&self.calendar_type)
    }

    /// Original day and month in a non gregorian calendar, if the reminder has them
    fn foreign_anniversary(&self) -> Option<(u32, u32)> {
        if self.is_gregorian() {
            return None;
        }
        match (self.original_day, self.original_month) {
            (Some(day), Some(month)) => Some((day, month)),
            _ => None,
        }
    }

    /// Stores the calendar the date was entered in and derives the gregorian anchor.
    ///
    /// Falls back to the gregorian calendar when the calendar type is unknown. A date
    /// that cannot be converted keeps the gregorian fields as they were. `today` is only
    /// used to pick a year when neither the original nor the gregorian year is known.
    pub fn normalize_calendar(
        &mut self,
        input: &CalendarInput,
        calendars: &CalendarRegistry,
        today: NaiveDate,
    ) -> CalendarNormalization {
        let calendar_type = input.calendar_type.as_deref().unwrap_or_default();
        if CalendarRegistry::is_gregorian(calendar_type) {
            self.calendar_type = GREGORIAN.into();
            self.original_day = None;
            self.original_month = None;
            self.original_year = None;
            return CalendarNormalization::Gregorian;
        }

        let converter = match calendars.lookup(calendar_type) {
            Ok(converter) => converter,
            Err(e) => {
                self.calendar_type = GREGORIAN.into();
                return CalendarNormalization::Unsupported(e);
            }
        };

        self.calendar_type = converter.name().to_string();
        self.original_day = input.original_day;
        self.original_month = input.original_month;
        self.original_year = input.original_year;

        let (day, month) = match (input.original_day, input.original_month) {
            (Some(day), Some(month)) => (day, month),
            _ => return CalendarNormalization::MissingOriginalDate,
        };
        let year = input
            .original_year
            .or(self.year)
            .unwrap_or_else(|| today.year());

        match converter.to_gregorian(CalendarDate::new(day, month, year)) {
            Ok(date) => {
                self.day = Some(date.day());
                self.month = Some(date.month());
                self.year = Some(date.year());
                CalendarNormalization::Converted
            }
            Err(e) => CalendarNormalization::ConversionFailed(e),
        }
    }

    /// When the first `ScheduledInstance` of this `Reminder` should fire.
    ///
    /// Non gregorian reminders are scheduled on the next occurrence of their original date
    /// that is today or later. An error means the calendar could not be used and the
    /// caller should fall back to `gregorian_initial_schedule`.
    pub fn initial_schedule(
        &self,
        calendars: &CalendarRegistry,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<DateTime<Utc>, CalendarError> {
        match self.foreign_anniversary() {
            Some((day, month)) => {
                let converter = calendars.lookup(&self.calendar_type)?;
                let yesterday = local_date(&now, tz) - Duration::days(1);
                let date = converter.next_occurrence(day, month, self.original_year, yesterday)?;
                Ok(at_local_hour(date, DEFAULT_REMINDER_HOUR, tz))
            }
            None => Ok(self.gregorian_initial_schedule(now, tz)),
        }
    }

    /// First schedule built from the gregorian fields. Missing parts default to the current
    /// year, January and the first day. A year agnostic date that already passed this year
    /// is moved to next year.
    pub fn gregorian_initial_schedule(&self, now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        let today = local_date(&now, tz);
        let year = self.year.unwrap_or_else(|| today.year());
        let month = self.month.unwrap_or(1);
        let day = self.day.unwrap_or(1);

        let date = date_clamped(year, month, day).unwrap_or(today);
        let scheduled_at = at_local_hour(date, DEFAULT_REMINDER_HOUR, tz);
        if self.year.is_none() && scheduled_at < now {
            let next_year = date_clamped(year + 1, month, day).unwrap_or(date);
            return at_local_hour(next_year, DEFAULT_REMINDER_HOUR, tz);
        }
        scheduled_at
    }

    /// When the next `ScheduledInstance` should fire after this `Reminder` fired at `now`.
    /// `None` for one time reminders.
    ///
    /// Yearly reminders in another calendar follow that calendar instead of adding years.
    /// An error means the calendar could not be used and the caller should fall back to
    /// `gregorian_next_schedule`.
    pub fn next_schedule(
        &self,
        calendars: &CalendarRegistry,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Option<DateTime<Utc>>, CalendarError> {
        match (self.reminder_type, self.foreign_anniversary()) {
            (ReminderType::RecurringYear, Some((day, month))) => {
                let converter = calendars.lookup(&self.calendar_type)?;
                let date = converter.next_occurrence(day, month, None, local_date(&now, tz))?;
                Ok(Some(at_local_hour(date, DEFAULT_REMINDER_HOUR, tz)))
            }
            _ => Ok(self.gregorian_next_schedule(now)),
        }
    }

    /// `None` for one time reminders and when the next occurrence is out of range
    pub fn gregorian_next_schedule(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let frequency = self.frequency_number.max(1);
        match self.reminder_type {
            ReminderType::OneTime => None,
            ReminderType::RecurringWeek => Duration::try_weeks(frequency as i64)
                .and_then(|interval| now.checked_add_signed(interval)),
            ReminderType::RecurringMonth => now.checked_add_months(Months::new(frequency)),
            ReminderType::RecurringYear => {
                now.checked_add_months(Months::new(frequency.saturating_mul(12)))
            }
        }
    }

    pub fn mark_triggered(&mut self, now: DateTime<Utc>) {
        self.last_triggered_at = Some(now);
        self.number_times_triggered += 1;
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
