use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstanceState {
    Pending,
    Delivered,
}

/// A single delivery of a `Reminder` to one `NotificationChannel` at one point in time.
///
/// The only transition is `Pending` -> `Delivered` which happens on a successful delivery.
/// A failed delivery keeps the instance pending so that it is retried on the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstance {
    pub id: ID,
    pub reminder_id: ID,
    pub channel_id: ID,
    pub scheduled_at: DateTime<Utc>,
    pub triggered_at: Option<DateTime<Utc>>,
}

impl ScheduledInstance {
    pub fn new(reminder_id: ID, channel_id: ID, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            reminder_id,
            channel_id,
            scheduled_at,
            triggered_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.triggered_at.is_none()
    }

    pub fn state(&self) -> InstanceState {
        if self.is_pending() {
            InstanceState::Pending
        } else {
            InstanceState::Delivered
        }
    }

    /// Scheduled at or before `now` and not delivered yet
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.scheduled_at <= now
    }
}

impl Entity for ScheduledInstance {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Append only history of delivery attempts on a channel. `error` is set iff the
/// delivery failed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    pub id: ID,
    pub channel_id: ID,
    pub sent_at: DateTime<Utc>,
    pub subject: String,
    pub payload: String,
    pub error: Option<String>,
}

impl DeliveryRecord {
    pub fn success(
        channel_id: ID,
        sent_at: DateTime<Utc>,
        subject: String,
        payload: String,
    ) -> Self {
        Self {
            id: Default::default(),
            channel_id,
            sent_at,
            subject,
            payload,
            error: None,
        }
    }

    pub fn failure(
        channel_id: ID,
        sent_at: DateTime<Utc>,
        subject: String,
        payload: String,
        error: &str,
    ) -> Self {
        let error = if error.trim().is_empty() {
            "Unknown delivery error".to_string()
        } else {
            error.to_string()
        };
        Self {
            error: Some(error),
            ..Self::success(channel_id, sent_at, subject, payload)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl Entity for DeliveryRecord {
    fn id(&self) -> &ID {
        &self.id
    }
}
