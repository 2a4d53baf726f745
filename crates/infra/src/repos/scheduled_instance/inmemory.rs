use super::IScheduledInstanceRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use kinfolk_domain::{ScheduledInstance, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryScheduledInstanceRepo {
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
}

impl InMemoryScheduledInstanceRepo {
    pub fn new(instances: Arc<Mutex<Vec<ScheduledInstance>>>) -> Self {
        Self { instances }
    }
}

#[async_trait::async_trait]
impl IScheduledInstanceRepo for InMemoryScheduledInstanceRepo {
    async fn enqueue(&self, instance: &ScheduledInstance) -> anyhow::Result<bool> {
        let mut instances = self.instances.lock().unwrap();
        let has_pending = instances.iter().any(|i| {
            i.is_pending()
                && i.reminder_id == instance.reminder_id
                && i.channel_id == instance.channel_id
        });
        if has_pending {
            return Ok(false);
        }
        instances.push(instance.clone());
        Ok(true)
    }

    async fn find(&self, instance_id: &ID) -> Option<ScheduledInstance> {
        find(instance_id, &self.instances)
    }

    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<ScheduledInstance>> {
        let mut due = find_by(&self.instances, |i| i.is_due(now));
        due.sort_by_key(|i| i.scheduled_at);
        Ok(due)
    }

    async fn find_by_reminder(&self, reminder_id: &ID) -> anyhow::Result<Vec<ScheduledInstance>> {
        let mut instances = find_by(&self.instances, |i| &i.reminder_id == reminder_id);
        instances.sort_by_key(|i| i.scheduled_at);
        Ok(instances)
    }

    async fn mark_triggered(
        &self,
        instance_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        update(instance_id, &self.instances, |i| {
            if i.is_pending() {
                i.triggered_at = Some(triggered_at);
            }
        });
        Ok(())
    }
}
