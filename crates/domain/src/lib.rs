mod calendar;
mod channel;
mod contact;
pub mod date;
mod notification;
mod reminder;
mod scheduled_instance;
mod shared;

pub use calendar::{
    CalendarConverter, CalendarDate, CalendarError, CalendarRegistry, GregorianCalendar,
    LunarCalendar, GREGORIAN,
};
pub use channel::{NotificationChannel, MAX_CHANNEL_FAILS};
pub use contact::{Contact, ImportantDate, VaultMembership};
pub use notification::Notification;
pub use reminder::{
    CalendarInput, CalendarNormalization, InvalidReminderTypeError, Reminder, ReminderType,
    DEFAULT_FREQUENCY, MAX_FREQUENCY,
};
pub use scheduled_instance::{DeliveryRecord, InstanceState, ScheduledInstance};
pub use shared::entity::{Entity, ID, InvalidIDError};
