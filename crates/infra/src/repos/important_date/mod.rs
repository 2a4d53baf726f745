mod inmemory;
mod postgres;

pub use inmemory::InMemoryImportantDateRepo;
use kinfolk_domain::{ImportantDate, ID};
pub use postgres::PostgresImportantDateRepo;

#[async_trait::async_trait]
pub trait IImportantDateRepo: Send + Sync {
    async fn insert(&self, important_date: &ImportantDate) -> anyhow::Result<()>;
    async fn save(&self, important_date: &ImportantDate) -> anyhow::Result<()>;
    async fn find(&self, important_date_id: &ID) -> Option<ImportantDate>;
    /// Deletes the important date together with its companion reminder
    async fn delete(&self, important_date_id: &ID) -> anyhow::Result<Option<ImportantDate>>;
}
