use crate::shared::entity::{Entity, ID};

const UNKNOWN_CONTACT_NAME: &str = "Unknown";

/// A person tracked inside a vault
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: ID,
    pub vault_id: ID,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Contact {
    pub fn new(vault_id: ID, first_name: Option<&str>, last_name: Option<&str>) -> Self {
        Self {
            id: Default::default(),
            vault_id,
            first_name: first_name.map(String::from),
            last_name: last_name.map(String::from),
        }
    }

    /// First and last name joined by a space, either side may be missing
    pub fn display_name(&self) -> String {
        let name = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            UNKNOWN_CONTACT_NAME.to_string()
        } else {
            name
        }
    }
}

impl Entity for Contact {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// A date that matters for a `Contact` (e.g. a birthday). When `remind_me` is set a
/// yearly `Reminder` is kept in sync with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportantDate {
    pub id: ID,
    pub contact_id: ID,
    pub label: Option<String>,
    /// e.g. `birthdate`, `deceased_date`
    pub date_type: Option<String>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub calendar_type: Option<String>,
    pub original_day: Option<u32>,
    pub original_month: Option<u32>,
    pub original_year: Option<i32>,
    pub remind_me: bool,
}

impl ImportantDate {
    pub fn new(contact_id: ID) -> Self {
        Self {
            id: Default::default(),
            contact_id,
            label: None,
            date_type: None,
            day: None,
            month: None,
            year: None,
            calendar_type: None,
            original_day: None,
            original_month: None,
            original_year: None,
            remind_me: false,
        }
    }

    /// Human readable label of the date type, `birthdate` -> `Birthdate`
    pub fn type_label(&self) -> Option<String> {
        let date_type = self.date_type.as_deref()?.trim();
        let mut chars = date_type.chars();
        let first = chars.next()?;
        let label = first.to_uppercase().chain(chars).collect::<String>();
        Some(label.replace('_', " "))
    }

    /// The explicit label, or the type label when there is none
    pub fn reminder_label(&self) -> Option<String> {
        self.label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(String::from)
            .or_else(|| self.type_label())
    }
}

impl Entity for ImportantDate {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaultMembership {
    pub vault_id: ID,
    pub user_id: ID,
}
