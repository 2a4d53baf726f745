use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Timezone every reminder fires in. Reminders fire at 09:00 in this timezone.
    pub timezone: Tz,
    /// How often the dispatcher looks for due reminders
    pub reminder_poll_interval_secs: u64,
    /// Upper bound on a single notification delivery
    pub notification_timeout_secs: u64,
    /// HTTP relay used to send emails. When missing, emails are only logged.
    pub mail_relay: Option<MailRelayConfig>,
    /// Base url of the ntfy server used by `ntfy` channels
    pub ntfy_url: String,
}

#[derive(Debug, Clone)]
pub struct MailRelayConfig {
    pub url: String,
    pub api_key: Option<String>,
}

const DEFAULT_PORT: usize = 5000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

impl Config {
    pub fn new() -> Self {
        let mail_relay = match std::env::var("MAIL_RELAY_URL") {
            Ok(url) if !url.trim().is_empty() => Some(MailRelayConfig {
                url,
                api_key: std::env::var("MAIL_RELAY_KEY").ok(),
            }),
            _ => {
                info!("Did not find MAIL_RELAY_URL environment variable. Emails will only be logged.");
                None
            }
        };
        let ntfy_url = std::env::var("NTFY_URL").unwrap_or_else(|_| DEFAULT_NTFY_URL.into());

        Self {
            port: parse_or_default("PORT", std::env::var("PORT").ok(), DEFAULT_PORT),
            timezone: parse_or_default(
                "SERVER_TIMEZONE",
                std::env::var("SERVER_TIMEZONE").ok(),
                Tz::UTC,
            ),
            reminder_poll_interval_secs: parse_or_default(
                "REMINDER_POLL_INTERVAL_SECS",
                std::env::var("REMINDER_POLL_INTERVAL_SECS").ok(),
                DEFAULT_POLL_INTERVAL_SECS,
            )
            .max(1),
            notification_timeout_secs: parse_or_default(
                "NOTIFICATION_TIMEOUT_SECS",
                std::env::var("NOTIFICATION_TIMEOUT_SECS").ok(),
                DEFAULT_NOTIFICATION_TIMEOUT_SECS,
            )
            .max(1),
            mail_relay,
            ntfy_url: ntfy_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
{
    let value = match value {
        Some(value) => value,
        None => return default,
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default value: {}.",
                name, value, default
            );
            default
        }
    }
}
