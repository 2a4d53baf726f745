use crate::{contact::Contact, reminder::Reminder};

/// A rendered reminder notification. The body is HTML, transports that only
/// deliver plain text downgrade it themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn for_reminder(reminder: &Reminder, contact: &Contact) -> Self {
        let contact_name = escape_html(&contact.display_name());
        let label = escape_html(&reminder.label);
        Self {
            subject: format!("Reminder: {}", reminder.label),
            body: format!(
                "<h2>Reminder: {label}</h2><p>You have a reminder for <strong>{contact_name}</strong>.</p><p>{label}</p>"
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
