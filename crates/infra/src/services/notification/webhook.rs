use super::{NotificationTransport, TransportError};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Posts the notification as JSON to the url stored on the channel
pub struct WebhookTransport {
    client: Client,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    subject: &'a str,
    body: &'a str,
}

impl WebhookTransport {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl NotificationTransport for WebhookTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        if !destination.starts_with("http://") && !destination.starts_with("https://") {
            return Err(TransportError::Other(format!(
                "Invalid webhook url: {}",
                destination
            )));
        }
        let res = self
            .client
            .post(destination)
            .timeout(self.timeout)
            .json(&WebhookPayload { subject, body })
            .send()
            .await?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        Err(TransportError::Rejected {
            status: status.as_u16(),
            body: res.text().await.unwrap_or_default(),
        })
    }
}
