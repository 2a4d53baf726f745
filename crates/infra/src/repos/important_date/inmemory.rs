use super::IImportantDateRepo;
use crate::repos::shared::inmemory_repo::*;
use kinfolk_domain::{ImportantDate, Reminder, ScheduledInstance, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryImportantDateRepo {
    important_dates: Arc<Mutex<Vec<ImportantDate>>>,
    reminders: Arc<Mutex<Vec<Reminder>>>,
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
}

impl InMemoryImportantDateRepo {
    pub fn new(
        important_dates: Arc<Mutex<Vec<ImportantDate>>>,
        reminders: Arc<Mutex<Vec<Reminder>>>,
        instances: Arc<Mutex<Vec<ScheduledInstance>>>,
    ) -> Self {
        Self {
            important_dates,
            reminders,
            instances,
        }
    }
}

#[async_trait::async_trait]
impl IImportantDateRepo for InMemoryImportantDateRepo {
    async fn insert(&self, important_date: &ImportantDate) -> anyhow::Result<()> {
        insert(important_date, &self.important_dates);
        Ok(())
    }

    async fn save(&self, important_date: &ImportantDate) -> anyhow::Result<()> {
        save(important_date, &self.important_dates);
        Ok(())
    }

    async fn find(&self, important_date_id: &ID) -> Option<ImportantDate> {
        find(important_date_id, &self.important_dates)
    }

    async fn delete(&self, important_date_id: &ID) -> anyhow::Result<Option<ImportantDate>> {
        let mut instances = self.instances.lock().unwrap();
        let mut reminders = self.reminders.lock().unwrap();
        let deleted = delete(important_date_id, &self.important_dates);
        if deleted.is_some() {
            let reminder_ids = find_and_delete_by(&mut *reminders, |r| {
                r.important_date_id.as_ref() == Some(important_date_id)
            })
            .into_iter()
            .map(|r| r.id)
            .collect::<Vec<_>>();
            find_and_delete_by(&mut *instances, |i| reminder_ids.contains(&i.reminder_id));
        }
        Ok(deleted)
    }
}
