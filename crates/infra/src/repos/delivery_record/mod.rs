mod inmemory;
mod postgres;

pub use inmemory::InMemoryDeliveryRecordRepo;
use kinfolk_domain::{DeliveryRecord, ScheduledInstance, ID};
pub use postgres::PostgresDeliveryRecordRepo;

#[async_trait::async_trait]
pub trait IDeliveryRecordRepo: Send + Sync {
    async fn insert(&self, record: &DeliveryRecord) -> anyhow::Result<()>;
    /// Delivery history of a channel, newest first
    async fn find_by_channel(
        &self,
        channel_id: &ID,
        limit: usize,
    ) -> anyhow::Result<Vec<DeliveryRecord>>;
    /// Stores a successful delivery of `instance` as one atomic change: appends the record,
    /// marks the instance as triggered at `record.sent_at`, resets the fails of the
    /// channel and counts the trigger on the reminder.
    /// Fails without storing anything when the instance is no longer pending.
    async fn record_success(
        &self,
        record: &DeliveryRecord,
        instance: &ScheduledInstance,
    ) -> anyhow::Result<()>;
}
