mod inmemory;
mod postgres;

pub use inmemory::InMemoryContactRepo;
use kinfolk_domain::{Contact, ID};
pub use postgres::PostgresContactRepo;

#[async_trait::async_trait]
pub trait IContactRepo: Send + Sync {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()>;
    async fn find(&self, contact_id: &ID) -> Option<Contact>;
    async fn find_many(&self, contact_ids: &[ID]) -> anyhow::Result<Vec<Contact>>;
    /// Deletes the contact together with its reminders and their scheduled instances
    async fn delete(&self, contact_id: &ID) -> anyhow::Result<Option<Contact>>;
}
