use chrono::{DateTime, Utc};
use kinfolk_domain::{InstanceState, Reminder, ReminderType, ScheduledInstance, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub contact_id: ID,
    pub important_date_id: Option<ID>,
    pub label: String,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub calendar_type: String,
    pub original_day: Option<u32>,
    pub original_month: Option<u32>,
    pub original_year: Option<i32>,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub frequency_number: u32,
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub number_times_triggered: i64,
}

impl ReminderDTO {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            id: reminder.id,
            contact_id: reminder.contact_id,
            important_date_id: reminder.important_date_id,
            label: reminder.label,
            day: reminder.day,
            month: reminder.month,
            year: reminder.year,
            calendar_type: reminder.calendar_type,
            original_day: reminder.original_day,
            original_month: reminder.original_month,
            original_year: reminder.original_year,
            reminder_type: reminder.reminder_type,
            frequency_number: reminder.frequency_number,
            last_triggered_at: reminder.last_triggered_at,
            number_times_triggered: reminder.number_times_triggered,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInstanceDTO {
    pub id: ID,
    pub reminder_id: ID,
    pub channel_id: ID,
    pub scheduled_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
    pub delivered: bool,
}

impl ScheduledInstanceDTO {
    pub fn new(instance: ScheduledInstance) -> Self {
        Self {
            delivered: instance.state() == InstanceState::Delivered,
            id: instance.id,
            reminder_id: instance.reminder_id,
            channel_id: instance.channel_id,
            scheduled_at: instance.scheduled_at,
            triggered_at: instance.triggered_at,
        }
    }
}
