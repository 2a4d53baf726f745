use chrono::{DateTime, Utc};
use kinfolk_domain::{DeliveryRecord, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecordDTO {
    pub id: ID,
    pub channel_id: ID,
    pub sent_at: DateTime<Utc>,
    pub subject: String,
    pub payload: String,
    pub error: Option<String>,
}

impl DeliveryRecordDTO {
    pub fn new(record: DeliveryRecord) -> Self {
        Self {
            id: record.id,
            channel_id: record.channel_id,
            sent_at: record.sent_at,
            subject: record.subject,
            payload: record.payload,
            error: record.error,
        }
    }
}
