mod inmemory;
mod postgres;

pub use inmemory::InMemoryVaultMembershipRepo;
use kinfolk_domain::{VaultMembership, ID};
pub use postgres::PostgresVaultMembershipRepo;

#[async_trait::async_trait]
pub trait IVaultMembershipRepo: Send + Sync {
    async fn insert(&self, membership: &VaultMembership) -> anyhow::Result<()>;
    async fn find_user_ids(&self, vault_id: &ID) -> anyhow::Result<Vec<ID>>;
}
