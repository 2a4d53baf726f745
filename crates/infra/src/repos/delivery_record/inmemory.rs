use super::IDeliveryRecordRepo;
use crate::repos::shared::inmemory_repo::*;
use kinfolk_domain::{DeliveryRecord, NotificationChannel, Reminder, ScheduledInstance, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryDeliveryRecordRepo {
    records: Arc<Mutex<Vec<DeliveryRecord>>>,
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
    channels: Arc<Mutex<Vec<NotificationChannel>>>,
    reminders: Arc<Mutex<Vec<Reminder>>>,
}

impl InMemoryDeliveryRecordRepo {
    pub fn new(
        records: Arc<Mutex<Vec<DeliveryRecord>>>,
        instances: Arc<Mutex<Vec<ScheduledInstance>>>,
        channels: Arc<Mutex<Vec<NotificationChannel>>>,
        reminders: Arc<Mutex<Vec<Reminder>>>,
    ) -> Self {
        Self {
            records,
            instances,
            channels,
            reminders,
        }
    }
}

#[async_trait::async_trait]
impl IDeliveryRecordRepo for InMemoryDeliveryRecordRepo {
    async fn insert(&self, record: &DeliveryRecord) -> anyhow::Result<()> {
        insert(record, &self.records);
        Ok(())
    }

    async fn find_by_channel(
        &self,
        channel_id: &ID,
        limit: usize,
    ) -> anyhow::Result<Vec<DeliveryRecord>> {
        let mut records = find_by(&self.records, |r| &r.channel_id == channel_id);
        records.sort_by_key(|r| r.sent_at);
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }

    async fn record_success(
        &self,
        record: &DeliveryRecord,
        instance: &ScheduledInstance,
    ) -> anyhow::Result<()> {
        // Every collection is locked up front so the change is applied at once
        let mut records = self.records.lock().unwrap();
        let mut instances = self.instances.lock().unwrap();
        let mut channels = self.channels.lock().unwrap();
        let mut reminders = self.reminders.lock().unwrap();

        let pending = instances
            .iter_mut()
            .find(|i| i.id == instance.id && i.is_pending())
            .ok_or_else(|| anyhow::anyhow!("Scheduled instance: {} is not pending", instance.id))?;
        pending.triggered_at = Some(record.sent_at);

        records.push(record.clone());
        if let Some(c) = channels.iter_mut().find(|c| c.id == record.channel_id) {
            c.fails = 0;
        }
        if let Some(r) = reminders.iter_mut().find(|r| r.id == instance.reminder_id) {
            r.mark_triggered(record.sent_at);
        }
        Ok(())
    }
}
