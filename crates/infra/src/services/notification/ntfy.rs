use super::{html_to_text, NotificationTransport, TransportError};
use reqwest::Client;
use std::time::Duration;

/// Publishes plain text notifications to an ntfy topic. The channel content is either
/// a topic on the configured server or the full url of a topic.
pub struct NtfyTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl NtfyTransport {
    pub fn new(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn topic_url(&self, destination: &str) -> String {
        if destination.starts_with("http://") || destination.starts_with("https://") {
            destination.to_string()
        } else {
            format!("{}/{}", self.base_url, destination.trim_start_matches('/'))
        }
    }
}

#[async_trait::async_trait]
impl NotificationTransport for NtfyTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        if destination.trim().is_empty() {
            return Err(TransportError::Other("Missing ntfy topic".into()));
        }
        let res = self
            .client
            .post(self.topic_url(destination))
            .timeout(self.timeout)
            .header("Title", subject)
            .body(html_to_text(body))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_resolves_topic_urls() {
        let transport =
            NtfyTransport::new(Client::new(), "https://ntfy.sh/", Duration::from_secs(1));
        assert_eq!(transport.topic_url("reminders"), "https://ntfy.sh/reminders");
        assert_eq!(
            transport.topic_url("https://push.example.com/family"),
            "https://push.example.com/family"
        );
    }
}
