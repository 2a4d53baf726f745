mod notification;

pub use notification::{
    html_to_text, MailRelayTransport, NoopTransport, NotificationTransport, NtfyTransport,
    TransportError, TransportRegistry, WebhookTransport,
};
