use super::{html_to_text, NotificationTransport, TransportError};
use crate::config::MailRelayConfig;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Sends emails through an HTTP mail relay
pub struct MailRelayTransport {
    client: Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct MailRelayRequest<'a> {
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: String,
}

impl MailRelayTransport {
    pub fn new(client: Client, config: &MailRelayConfig, timeout: Duration) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl NotificationTransport for MailRelayTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        if !destination.contains('@') {
            return Err(TransportError::Other(format!(
                "Invalid email address: {}",
                destination
            )));
        }
        let request = MailRelayRequest {
            to: destination,
            subject,
            html: body,
            text: html_to_text(body),
        };
        let mut req = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
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
