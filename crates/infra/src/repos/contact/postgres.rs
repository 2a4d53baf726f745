use super::IContactRepo;
use kinfolk_domain::{Contact, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresContactRepo {
    pool: PgPool,
}

impl PostgresContactRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ContactRaw {
    contact_uid: Uuid,
    vault_uid: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<ContactRaw> for Contact {
    fn from(e: ContactRaw) -> Self {
        Self {
            id: e.contact_uid.into(),
            vault_id: e.vault_uid.into(),
            first_name: e.first_name,
            last_name: e.last_name,
        }
    }
}

#[async_trait::async_trait]
impl IContactRepo for PostgresContactRepo {
    async fn insert(&self, contact: &Contact) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts(contact_uid, vault_uid, first_name, last_name)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(contact.id.inner_ref())
        .bind(contact.vault_id.inner_ref())
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert contact: {:?}. DB returned error: {:?}",
                contact, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, contact_id: &ID) -> Option<Contact> {
        let res: Option<ContactRaw> = sqlx::query_as(
            r#"
            SELECT * FROM contacts
            WHERE contact_uid = $1
            "#,
        )
        .bind(contact_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find contact with id: {:?} failed. DB returned error: {:?}",
                contact_id, e
            );
            e
        })
        .ok()?;
        res.map(|contact| contact.into())
    }

    async fn find_many(&self, contact_ids: &[ID]) -> anyhow::Result<Vec<Contact>> {
        let ids = contact_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let raws: Vec<ContactRaw> = sqlx::query_as(
            r#"
            SELECT * FROM contacts
            WHERE contact_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|c| c.into()).collect())
    }

    async fn delete(&self, contact_id: &ID) -> anyhow::Result<Option<Contact>> {
        // Reminders and their instances are removed by the foreign key cascades
        let res: Option<ContactRaw> = sqlx::query_as(
            r#"
            DELETE FROM contacts
            WHERE contact_uid = $1
            RETURNING *
            "#,
        )
        .bind(contact_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(res.map(|contact| contact.into()))
    }
}
