use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use kinfolk_domain::{Reminder, ScheduledInstance, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryReminderRepo {
    reminders: Arc<Mutex<Vec<Reminder>>>,
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
}

impl InMemoryReminderRepo {
    pub fn new(
        reminders: Arc<Mutex<Vec<Reminder>>>,
        instances: Arc<Mutex<Vec<ScheduledInstance>>>,
    ) -> Self {
        Self {
            reminders,
            instances,
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        save(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_many(&self, reminder_ids: &[ID]) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_many(reminder_ids, &self.reminders))
    }

    async fn find_by_important_date(&self, important_date_id: &ID) -> Option<Reminder> {
        find_by(&self.reminders, |r| {
            r.important_date_id.as_ref() == Some(important_date_id)
        })
        .into_iter()
        .next()
    }

    async fn delete(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        let mut instances = self.instances.lock().unwrap();
        let deleted = delete(reminder_id, &self.reminders);
        if deleted.is_some() {
            find_and_delete_by(&mut *instances, |i| &i.reminder_id == reminder_id);
        }
        Ok(deleted)
    }

    async fn increment_trigger_counter(
        &self,
        reminder_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        update(reminder_id, &self.reminders, |r| r.mark_triggered(triggered_at));
        Ok(())
    }
}
