mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryReminderRepo;
use kinfolk_domain::{Reminder, ID};
pub use postgres::PostgresReminderRepo;

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    async fn find_many(&self, reminder_ids: &[ID]) -> anyhow::Result<Vec<Reminder>>;
    async fn find_by_important_date(&self, important_date_id: &ID) -> Option<Reminder>;
    /// Deletes the `Reminder` together with its `ScheduledInstance`s in one transaction
    async fn delete(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    async fn increment_trigger_counter(
        &self,
        reminder_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
