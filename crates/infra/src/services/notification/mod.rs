mod mail_relay;
mod ntfy;
mod webhook;

use crate::Config;
use kinfolk_domain::NotificationChannel;
pub use mail_relay::MailRelayTransport;
pub use ntfy::NtfyTransport;
use regex::Regex;
use reqwest::Client;
use std::{
    collections::HashMap,
    sync::{Arc, OnceLock},
    time::Duration,
};
use thiserror::Error;
use tracing::{info, warn};
pub use webhook::WebhookTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request to transport failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Transport rejected the notification with status: {status}. Response: {body}")]
    Rejected { status: u16, body: String },
    #[error("No transport is configured for channel type: {0}")]
    Unconfigured(String),
    #[error("{0}")]
    Other(String),
}

/// Delivers a rendered notification to a destination. Transports must enforce their
/// own timeout and must not touch the store.
#[async_trait::async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError>;
}

/// Logs the notification and reports success. Used for channel types without a
/// configured backend.
pub struct NoopTransport;

#[async_trait::async_trait]
impl NotificationTransport for NoopTransport {
    async fn send(
        &self,
        destination: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), TransportError> {
        info!(
            "No transport configured, skipping notification: {:?} to: {}",
            subject, destination
        );
        Ok(())
    }
}

/// Routes notifications to the transport of the channel type
#[derive(Clone)]
pub struct TransportRegistry {
    transports: HashMap<String, Arc<dyn NotificationTransport>>,
    fallback: Arc<dyn NotificationTransport>,
}

impl TransportRegistry {
    /// A registry where every channel type falls back to the `NoopTransport`
    pub fn new() -> Self {
        Self {
            transports: HashMap::new(),
            fallback: Arc::new(NoopTransport),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.notification_timeout_secs);
        let client = Client::new();

        let mut registry = Self::new()
            .with_transport("webhook", Arc::new(WebhookTransport::new(client.clone(), timeout)))
            .with_transport(
                "ntfy",
                Arc::new(NtfyTransport::new(client.clone(), &config.ntfy_url, timeout)),
            );
        match &config.mail_relay {
            Some(relay) => {
                registry = registry.with_transport(
                    "email",
                    Arc::new(MailRelayTransport::new(client, relay, timeout)),
                );
            }
            None => {
                registry = registry.with_transport("email", Arc::new(NoopTransport));
            }
        }
        registry
    }

    pub fn with_transport(mut self, kind: &str, transport: Arc<dyn NotificationTransport>) -> Self {
        self.transports.insert(kind.to_lowercase(), transport);
        self
    }

    pub fn get(&self, kind: &str) -> Arc<dyn NotificationTransport> {
        match self.transports.get(&kind.to_lowercase()) {
            Some(transport) => transport.clone(),
            None => {
                warn!(
                    "Unknown channel type: {}, falling back to the noop transport",
                    kind
                );
                self.fallback.clone()
            }
        }
    }

    pub async fn send(
        &self,
        channel: &NotificationChannel,
        subject: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        self.get(&channel.channel_type)
            .send(&channel.content, subject, body)
            .await
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn line_break_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(p|div|h[1-6]|li|tr)\s*>")
            .expect("Line break pattern to be valid")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Tag pattern to be valid"))
}

/// Downgrades an HTML body for plain text transports
pub fn html_to_text(html: &str) -> String {
    let text = line_break_regex().replace_all(html, "\n");
    let text = tag_regex().replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingTransport {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl NotificationTransport for RecordingTransport {
        async fn send(&self, destination: &str, _: &str, _: &str) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(destination.to_string());
            Ok(())
        }
    }

    #[test]
    fn it_strips_html() {
        let html = "<h2>Reminder: Tom &amp; Jerry</h2>\
            <p>You have a reminder for <strong>Ada Lovelace</strong>.</p>\
            <p>Tom &amp; Jerry</p>";
        assert_eq!(
            html_to_text(html),
            "Reminder: Tom & Jerry\nYou have a reminder for Ada Lovelace.\nTom & Jerry"
        );
        assert_eq!(html_to_text("line<br/>next<BR>last"), "line\nnext\nlast");
        assert_eq!(html_to_text("plain"), "plain");
    }

    #[tokio::test]
    async fn it_routes_by_channel_type() {
        let recorder = Arc::new(RecordingTransport {
            sent: Mutex::new(Vec::new()),
        });
        let registry = TransportRegistry::new().with_transport("Email", recorder.clone());

        let channel =
            NotificationChannel::new(kinfolk_domain::ID::default(), "email", "me@example.com");
        assert!(registry.send(&channel, "s", "b").await.is_ok());

        // Unknown types are delivered through the noop transport
        let channel = NotificationChannel::new(kinfolk_domain::ID::default(), "pigeon", "roof");
        assert!(registry.send(&channel, "s", "b").await.is_ok());

        assert_eq!(*recorder.sent.lock().unwrap(), vec!["me@example.com".to_string()]);
    }
}
