use super::IContactRepo;
use crate::repos::shared::inmemory_repo::*;
use kinfolk_domain::{Contact, Reminder, ScheduledInstance, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryContactRepo {
    contacts: Arc<Mutex<Vec<Contact>>>,
    reminders: Arc<Mutex<Vec<Reminder>>>,
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
}

impl InMemoryContactRepo {
    pub fn new(
        contacts: Arc<Mutex<Vec<Contact>>>,
        reminders: Arc<Mutex<Vec<Reminder>>>,
        instances: Arc<Mutex<Vec<ScheduledInstance>>>,
    ) -> Self {
        Self {
            contacts,
            reminders,
            instances,
        }
    }
}

#[async_trait::async_trait]
impl IContactRepo for InMemoryContactRepo {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()> {
        insert(contact, &self.contacts);
        Ok(())
    }

    async fn find(&self, contact_id: &ID) -> Option<Contact> {
        find(contact_id, &self.contacts)
    }

    async fn find_many(&self, contact_ids: &[ID]) -> anyhow::Result<Vec<Contact>> {
        Ok(find_many(contact_ids, &self.contacts))
    }

    async fn delete(&self, contact_id: &ID) -> anyhow::Result<Option<Contact>> {
        let mut instances = self.instances.lock().unwrap();
        let mut reminders = self.reminders.lock().unwrap();
        let deleted = delete(contact_id, &self.contacts);
        if deleted.is_some() {
            let reminder_ids = find_and_delete_by(&mut *reminders, |r| &r.contact_id == contact_id)
                .into_iter()
                .map(|r| r.id)
                .collect::<Vec<_>>();
            find_and_delete_by(&mut *instances, |i| reminder_ids.contains(&i.reminder_id));
        }
        Ok(deleted)
    }
}
