use super::IVaultMembershipRepo;
use kinfolk_domain::{VaultMembership, ID};
use sqlx::{types::Uuid, PgPool};
use tracing::error;

pub struct PostgresVaultMembershipRepo {
    pool: PgPool,
}

impl PostgresVaultMembershipRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IVaultMembershipRepo for PostgresVaultMembershipRepo {
    async fn insert(&self, membership: &VaultMembership) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vault_memberships(vault_uid, user_uid)
            VALUES($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(membership.vault_id.inner_ref())
        .bind(membership.user_id.inner_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert vault membership: {:?}. DB returned error: {:?}",
                membership, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_user_ids(&self, vault_id: &ID) -> anyhow::Result<Vec<ID>> {
        let user_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_uid FROM vault_memberships
            WHERE vault_uid = $1
            "#,
        )
        .bind(vault_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(user_ids.into_iter().map(|id| id.into()).collect())
    }
}
