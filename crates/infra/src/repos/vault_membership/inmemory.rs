use super::IVaultMembershipRepo;
use crate::repos::shared::inmemory_repo::*;
use kinfolk_domain::{VaultMembership, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryVaultMembershipRepo {
    memberships: Arc<Mutex<Vec<VaultMembership>>>,
}

impl InMemoryVaultMembershipRepo {
    pub fn new(memberships: Arc<Mutex<Vec<VaultMembership>>>) -> Self {
        Self { memberships }
    }
}

#[async_trait::async_trait]
impl IVaultMembershipRepo for InMemoryVaultMembershipRepo {
    async fn insert(&self, membership: &VaultMembership) -> anyhow::Result<()> {
        if find_by(&self.memberships, |m| m == membership).is_empty() {
            insert(membership, &self.memberships);
        }
        Ok(())
    }

    async fn find_user_ids(&self, vault_id: &ID) -> anyhow::Result<Vec<ID>> {
        Ok(find_by(&self.memberships, |m| &m.vault_id == vault_id)
            .into_iter()
            .map(|m| m.user_id)
            .collect())
    }
}
