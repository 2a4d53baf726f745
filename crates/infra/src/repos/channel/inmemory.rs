use super::INotificationChannelRepo;
use crate::repos::shared::inmemory_repo::*;
use anyhow::anyhow;
use kinfolk_domain::{NotificationChannel, ScheduledInstance, VaultMembership, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryNotificationChannelRepo {
    channels: Arc<Mutex<Vec<NotificationChannel>>>,
    memberships: Arc<Mutex<Vec<VaultMembership>>>,
    instances: Arc<Mutex<Vec<ScheduledInstance>>>,
}

impl InMemoryNotificationChannelRepo {
    pub fn new(
        channels: Arc<Mutex<Vec<NotificationChannel>>>,
        memberships: Arc<Mutex<Vec<VaultMembership>>>,
        instances: Arc<Mutex<Vec<ScheduledInstance>>>,
    ) -> Self {
        Self {
            channels,
            memberships,
            instances,
        }
    }
}

#[async_trait::async_trait]
impl INotificationChannelRepo for InMemoryNotificationChannelRepo {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()> {
        insert(channel, &self.channels);
        Ok(())
    }

    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel> {
        find(channel_id, &self.channels)
    }

    async fn find_many(&self, channel_ids: &[ID]) -> anyhow::Result<Vec<NotificationChannel>> {
        Ok(find_many(channel_ids, &self.channels))
    }

    async fn find_by_vault(
        &self,
        vault_id: &ID,
        active_only: bool,
    ) -> anyhow::Result<Vec<NotificationChannel>> {
        let user_ids = find_by(&self.memberships, |m| &m.vault_id == vault_id)
            .into_iter()
            .map(|m| m.user_id)
            .collect::<Vec<_>>();
        Ok(find_by(&self.channels, |c| {
            user_ids.contains(&c.user_id) && (!active_only || c.can_be_scheduled())
        }))
    }

    async fn bump_fails(&self, channel_id: &ID) -> anyhow::Result<i32> {
        update(channel_id, &self.channels, |c| c.fails += 1)
            .map(|c| c.fails)
            .ok_or_else(|| anyhow!("Channel with id: {} was not found", channel_id))
    }

    async fn reset_fails(&self, channel_id: &ID) -> anyhow::Result<()> {
        update(channel_id, &self.channels, |c| c.fails = 0);
        Ok(())
    }

    async fn set_active(&self, channel_id: &ID, active: bool) -> anyhow::Result<()> {
        update(channel_id, &self.channels, |c| c.active = active);
        Ok(())
    }

    async fn delete(&self, channel_id: &ID) -> anyhow::Result<Option<NotificationChannel>> {
        let mut instances = self.instances.lock().unwrap();
        let deleted = delete(channel_id, &self.channels);
        if deleted.is_some() {
            find_and_delete_by(&mut *instances, |i| &i.channel_id == channel_id);
        }
        Ok(deleted)
    }
}
