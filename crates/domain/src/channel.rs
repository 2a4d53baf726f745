use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};

/// A channel that has failed this many deliveries in a row is disabled
pub const MAX_CHANNEL_FAILS: i32 = 10;

/// A destination owned by a user through which notifications are delivered.
/// `channel_type` names the transport (e.g. `email`) and `content` is the address
/// in the format that transport expects.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationChannel {
    pub id: ID,
    pub user_id: ID,
    pub channel_type: String,
    pub content: String,
    pub active: bool,
    /// Consecutive failed deliveries
    pub fails: i32,
    pub verified_at: Option<DateTime<Utc>>,
}

impl NotificationChannel {
    pub fn new(user_id: ID, channel_type: &str, content: &str) -> Self {
        Self {
            id: Default::default(),
            user_id,
            channel_type: channel_type.to_lowercase(),
            content: content.to_string(),
            active: true,
            fails: 0,
            verified_at: None,
        }
    }

    /// Only active and verified channels are targets of new scheduled instances
    pub fn can_be_scheduled(&self) -> bool {
        self.active && self.verified_at.is_some()
    }

    pub fn has_reached_max_fails(&self) -> bool {
        self.fails >= MAX_CHANNEL_FAILS
    }
}

impl Entity for NotificationChannel {
    fn id(&self) -> &ID {
        &self.id
    }
}
