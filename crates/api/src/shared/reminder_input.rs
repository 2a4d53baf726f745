use chrono::{DateTime, Utc};
use kinfolk_api_structs::ReminderRequestBody;
use kinfolk_domain::{
    date::{is_valid_partial_date, local_date},
    CalendarInput, CalendarNormalization, Contact, ImportantDate, Reminder, ReminderType,
    ScheduledInstance, DEFAULT_FREQUENCY, MAX_FREQUENCY,
};
use kinfolk_infra::KinfolkContext;
use tracing::{debug, warn};

/// The editable fields of a `Reminder`
#[derive(Debug, Clone)]
pub struct ReminderInput {
    pub label: Option<String>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub calendar: CalendarInput,
    pub reminder_type: Option<ReminderType>,
    pub frequency_number: Option<u32>,
}

#[derive(Debug, PartialEq)]
pub enum InvalidReminderInput {
    LabelRequired,
    TypeRequired,
    InvalidFrequency(u32),
    InvalidDate {
        day: Option<u32>,
        month: Option<u32>,
        year: Option<i32>,
    },
    MissingOriginalDate(String),
}

impl InvalidReminderInput {
    pub fn message(&self) -> String {
        match self {
            Self::LabelRequired => "A label is required for the reminder".into(),
            Self::TypeRequired => "The type of the reminder is required".into(),
            Self::InvalidFrequency(frequency) => format!(
                "The frequency number: {} is not valid, it has to be between 1 and {}",
                frequency, MAX_FREQUENCY
            ),
            Self::InvalidDate { day, month, year } => format!(
                "The date with day: {:?}, month: {:?} and year: {:?} is not valid",
                day, month, year
            ),
            Self::MissingOriginalDate(calendar) => format!(
                "The original day and month are required for reminders in the {} calendar",
                calendar
            ),
        }
    }
}

impl From<ReminderRequestBody> for ReminderInput {
    fn from(body: ReminderRequestBody) -> Self {
        Self {
            label: body.label,
            day: body.day,
            month: body.month,
            year: body.year,
            calendar: CalendarInput {
                calendar_type: body.calendar_type,
                original_day: body.original_day,
                original_month: body.original_month,
                original_year: body.original_year,
            },
            reminder_type: body.reminder_type,
            frequency_number: body.frequency_number,
        }
    }
}

impl ReminderInput {
    /// Input for the yearly companion reminder of an `ImportantDate`
    pub fn from_important_date(date: &ImportantDate) -> Self {
        Self {
            label: date.reminder_label(),
            day: date.day,
            month: date.month,
            year: date.year,
            calendar: CalendarInput {
                calendar_type: date.calendar_type.clone(),
                original_day: date.original_day,
                original_month: date.original_month,
                original_year: date.original_year,
            },
            reminder_type: Some(ReminderType::RecurringYear),
            frequency_number: Some(DEFAULT_FREQUENCY),
        }
    }

    fn validate(&self) -> Result<(ReminderType, u32), InvalidReminderInput> {
        let reminder_type = self.reminder_type.ok_or(InvalidReminderInput::TypeRequired)?;
        let frequency = self.frequency_number.unwrap_or(DEFAULT_FREQUENCY);
        if !(1..=MAX_FREQUENCY).contains(&frequency) {
            return Err(InvalidReminderInput::InvalidFrequency(frequency));
        }
        if !is_valid_partial_date(self.day, self.month, self.year) {
            return Err(InvalidReminderInput::InvalidDate {
                day: self.day,
                month: self.month,
                year: self.year,
            });
        }
        let original = &self.calendar;
        let original_in_range = original.original_day.map_or(true, |d| (1..=31).contains(&d))
            && original.original_month.map_or(true, |m| (1..=12).contains(&m));
        if !original_in_range {
            return Err(InvalidReminderInput::InvalidDate {
                day: original.original_day,
                month: original.original_month,
                year: original.original_year,
            });
        }
        Ok((reminder_type, frequency))
    }

    fn resolve_label(&self, fallback: Option<String>) -> Result<String, InvalidReminderInput> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(String::from)
            .or(fallback)
            .ok_or(InvalidReminderInput::LabelRequired)
    }

    /// Copies the input onto the `Reminder` and normalizes its calendar fields.
    /// `fallback_label` is used when the input has no label.
    pub fn apply(
        &self,
        reminder: &mut Reminder,
        fallback_label: Option<String>,
        ctx: &KinfolkContext,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidReminderInput> {
        let (reminder_type, frequency_number) = self.validate()?;
        reminder.label = self.resolve_label(fallback_label)?;
        reminder.reminder_type = reminder_type;
        reminder.frequency_number = frequency_number;
        reminder.day = self.day;
        reminder.month = self.month;
        reminder.year = self.year;

        let today = local_date(&now, &ctx.config.timezone);
        match reminder.normalize_calendar(&self.calendar, &ctx.calendars, today) {
            CalendarNormalization::Gregorian | CalendarNormalization::Converted => Ok(()),
            CalendarNormalization::Unsupported(e) => {
                warn!(
                    "{}. Storing reminder: {} as gregorian.",
                    e, reminder.id
                );
                Ok(())
            }
            CalendarNormalization::ConversionFailed(e) => {
                warn!(
                    "Unable to convert the date of reminder: {} to gregorian: {}",
                    reminder.id, e
                );
                Ok(())
            }
            CalendarNormalization::MissingOriginalDate => Err(
                InvalidReminderInput::MissingOriginalDate(reminder.calendar_type.clone()),
            ),
        }
    }
}

/// When the first instance of the `Reminder` fires, falling back to the gregorian
/// date fields when its calendar can not be used
pub fn initial_schedule_at(
    reminder: &Reminder,
    ctx: &KinfolkContext,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let tz = &ctx.config.timezone;
    match reminder.initial_schedule(&ctx.calendars, now, tz) {
        Ok(scheduled_at) => scheduled_at,
        Err(e) => {
            warn!(
                "Unable to schedule reminder: {} in the {} calendar: {}. Falling back to gregorian.",
                reminder.id, reminder.calendar_type, e
            );
            reminder.gregorian_initial_schedule(now, tz)
        }
    }
}

/// Queues the first instance of the `Reminder` on every schedulable channel of the users
/// in the vault of the `Contact`
pub async fn schedule_initial_instances(
    reminder: &Reminder,
    contact: &Contact,
    ctx: &KinfolkContext,
    now: DateTime<Utc>,
) -> anyhow::Result<Vec<ScheduledInstance>> {
    let channels = ctx
        .repos
        .channels
        .find_by_vault(&contact.vault_id, true)
        .await?;
    let scheduled_at = initial_schedule_at(reminder, ctx, now);

    let mut instances = Vec::with_capacity(channels.len());
    for channel in channels {
        let instance = ScheduledInstance::new(reminder.id.clone(), channel.id, scheduled_at);
        if ctx.repos.scheduled_instances.enqueue(&instance).await? {
            instances.push(instance);
        }
    }
    debug!(
        "Scheduled {} instances of reminder: {} at: {}",
        instances.len(),
        reminder.id,
        scheduled_at
    );
    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinfolk_domain::ID;

    fn input() -> ReminderInput {
        ReminderInput {
            label: Some("Dentist".into()),
            day: Some(5),
            month: Some(2),
            year: None,
            calendar: CalendarInput::default(),
            reminder_type: Some(ReminderType::OneTime),
            frequency_number: None,
        }
    }

    #[test]
    fn it_validates_input() {
        assert_eq!(input().validate(), Ok((ReminderType::OneTime, 1)));

        let mut i = input();
        i.frequency_number = Some(0);
        assert_eq!(i.validate(), Err(InvalidReminderInput::InvalidFrequency(0)));

        let mut i = input();
        i.frequency_number = Some(MAX_FREQUENCY);
        assert_eq!(i.validate(), Ok((ReminderType::OneTime, MAX_FREQUENCY)));
        i.frequency_number = Some(MAX_FREQUENCY + 1);
        assert_eq!(
            i.validate(),
            Err(InvalidReminderInput::InvalidFrequency(MAX_FREQUENCY + 1))
        );
        i.frequency_number = Some(1_000_000_000);
        assert!(i.validate().is_err());

        let mut i = input();
        i.reminder_type = None;
        assert_eq!(i.validate(), Err(InvalidReminderInput::TypeRequired));

        let mut i = input();
        i.day = Some(30);
        assert!(i.validate().is_err());

        let mut i = input();
        i.calendar.original_month = Some(13);
        assert!(i.validate().is_err());
    }

    #[test]
    fn it_resolves_labels() {
        let mut i = input();
        assert_eq!(i.resolve_label(Some("Birthdate".into())), Ok("Dentist".into()));
        i.label = Some("  ".into());
        assert_eq!(i.resolve_label(Some("Birthdate".into())), Ok("Birthdate".into()));
        assert_eq!(i.resolve_label(None), Err(InvalidReminderInput::LabelRequired));
    }

    #[test]
    fn it_applies_lunar_input() {
        let mut ctx = KinfolkContext::create_inmemory();
        ctx.config.timezone = chrono_tz::UTC;
        let mut i = input();
        i.reminder_type = Some(ReminderType::RecurringYear);
        i.day = None;
        i.month = None;
        i.calendar = CalendarInput {
            calendar_type: Some("chinese".into()),
            original_day: Some(15),
            original_month: Some(8),
            original_year: None,
        };
        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 1, 15, 10, 0, 0).unwrap();

        let mut reminder = Reminder::new(ID::default(), String::new(), ReminderType::OneTime);
        assert!(i.apply(&mut reminder, None, &ctx, now).is_ok());
        assert_eq!(reminder.calendar_type, "lunar");
        assert_eq!(
            (reminder.day, reminder.month, reminder.year),
            (Some(25), Some(9), Some(2026))
        );

        i.calendar.original_month = None;
        assert_eq!(
            i.apply(&mut reminder, None, &ctx, now),
            Err(InvalidReminderInput::MissingOriginalDate("lunar".into()))
        );
    }
}
