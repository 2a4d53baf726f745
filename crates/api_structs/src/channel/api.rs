use crate::dtos::DeliveryRecordDTO;
use kinfolk_domain::{DeliveryRecord, NotificationChannel, ID};
use serde::{Deserialize, Serialize};

pub mod get_channel_deliveries {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub channel_id: ID,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub limit: Option<usize>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub channel_id: ID,
        pub active: Option<bool>,
        pub fails: Option<i32>,
        pub deliveries: Vec<DeliveryRecordDTO>,
    }

    impl APIResponse {
        /// `channel` is missing when the history belongs to a deleted channel
        pub fn new(
            channel_id: ID,
            channel: Option<NotificationChannel>,
            deliveries: Vec<DeliveryRecord>,
        ) -> Self {
            Self {
                channel_id,
                active: channel.as_ref().map(|c| c.active),
                fails: channel.as_ref().map(|c| c.fails),
                deliveries: deliveries
                    .into_iter()
                    .map(DeliveryRecordDTO::new)
                    .collect(),
            }
        }
    }
}
