use crate::dtos::ReminderDTO;
use kinfolk_domain::{Reminder, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionReminderResponse {
    /// Missing when the important date has no companion reminder
    pub reminder: Option<ReminderDTO>,
}

impl CompanionReminderResponse {
    pub fn new(reminder: Option<Reminder>) -> Self {
        Self {
            reminder: reminder.map(ReminderDTO::new),
        }
    }
}

pub mod sync_important_date_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub important_date_id: ID,
    }

    pub type APIResponse = CompanionReminderResponse;
}

pub mod remove_important_date_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub important_date_id: ID,
    }

    pub type APIResponse = CompanionReminderResponse;
}
