mod inmemory;
mod postgres;

pub use inmemory::InMemoryNotificationChannelRepo;
use kinfolk_domain::{NotificationChannel, ID};
pub use postgres::PostgresNotificationChannelRepo;

#[async_trait::async_trait]
pub trait INotificationChannelRepo: Send + Sync {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()>;
    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel>;
    async fn find_many(&self, channel_ids: &[ID]) -> anyhow::Result<Vec<NotificationChannel>>;
    /// Channels of every user that is a member of the vault. With `active_only` only
    /// channels that can be scheduled (active and verified) are returned.
    async fn find_by_vault(
        &self,
        vault_id: &ID,
        active_only: bool,
    ) -> anyhow::Result<Vec<NotificationChannel>>;
    /// Increments the fails counter and returns the new value
    async fn bump_fails(&self, channel_id: &ID) -> anyhow::Result<i32>;
    async fn reset_fails(&self, channel_id: &ID) -> anyhow::Result<()>;
    async fn set_active(&self, channel_id: &ID, active: bool) -> anyhow::Result<()>;
    /// Deletes the channel and its scheduled instances. Delivery history is kept.
    async fn delete(&self, channel_id: &ID) -> anyhow::Result<Option<NotificationChannel>>;
}
