use crate::dtos::{ReminderDTO, ScheduledInstanceDTO};
use kinfolk_domain::{Reminder, ReminderType, ScheduledInstance, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

/// Fields of a `Reminder` that are given when creating or editing it.
/// `day`, `month` and `year` are gregorian, the `original*` fields are in `calendarType`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRequestBody {
    pub label: Option<String>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub calendar_type: Option<String>,
    pub original_day: Option<u32>,
    pub original_month: Option<u32>,
    pub original_year: Option<i32>,
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
    pub frequency_number: Option<u32>,
}

pub mod create_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub contact_id: ID,
    }

    pub type RequestBody = ReminderRequestBody;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminder: ReminderDTO,
        pub scheduled_instances: Vec<ScheduledInstanceDTO>,
    }

    impl APIResponse {
        pub fn new(reminder: Reminder, instances: Vec<ScheduledInstance>) -> Self {
            Self {
                reminder: ReminderDTO::new(reminder),
                scheduled_instances: instances
                    .into_iter()
                    .map(ScheduledInstanceDTO::new)
                    .collect(),
            }
        }
    }
}

pub mod update_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type RequestBody = ReminderRequestBody;

    pub type APIResponse = ReminderResponse;
}

pub mod delete_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_reminder_instances {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub instances: Vec<ScheduledInstanceDTO>,
    }

    impl APIResponse {
        pub fn new(instances: Vec<ScheduledInstance>) -> Self {
            Self {
                instances: instances
                    .into_iter()
                    .map(ScheduledInstanceDTO::new)
                    .collect(),
            }
        }
    }
}
