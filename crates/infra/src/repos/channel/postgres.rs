use super::INotificationChannelRepo;
use chrono::{DateTime, Utc};
use kinfolk_domain::{NotificationChannel, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresNotificationChannelRepo {
    pool: PgPool,
}

impl PostgresNotificationChannelRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationChannelRaw {
    channel_uid: Uuid,
    user_uid: Uuid,
    channel_type: String,
    content: String,
    active: bool,
    fails: i32,
    verified_at: Option<DateTime<Utc>>,
}

impl From<NotificationChannelRaw> for NotificationChannel {
    fn from(e: NotificationChannelRaw) -> Self {
        Self {
            id: e.channel_uid.into(),
            user_id: e.user_uid.into(),
            channel_type: e.channel_type,
            content: e.content,
            active: e.active,
            fails: e.fails,
            verified_at: e.verified_at,
        }
    }
}

#[async_trait::async_trait]
impl INotificationChannelRepo for PostgresNotificationChannelRepo {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_channels(channel_uid, user_uid, channel_type, content, active, fails, verified_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(channel.id.inner_ref())
        .bind(channel.user_id.inner_ref())
        .bind(&channel.channel_type)
        .bind(&channel.content)
        .bind(channel.active)
        .bind(channel.fails)
        .bind(channel.verified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert notification channel: {:?}. DB returned error: {:?}",
                channel, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel> {
        let res: Option<NotificationChannelRaw> = sqlx::query_as(
            r#"
            SELECT * FROM notification_channels
            WHERE channel_uid = $1
            "#,
        )
        .bind(channel_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find notification channel with id: {:?} failed. DB returned error: {:?}",
                channel_id, e
            );
            e
        })
        .ok()?;
        res.map(|channel| channel.into())
    }

    async fn find_many(&self, channel_ids: &[ID]) -> anyhow::Result<Vec<NotificationChannel>> {
        let ids = channel_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let raws: Vec<NotificationChannelRaw> = sqlx::query_as(
            r#"
            SELECT * FROM notification_channels
            WHERE channel_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find notification channels with ids: {:?} failed. DB returned error: {:?}",
                channel_ids, e
            );
            e
        })?;
        Ok(raws.into_iter().map(|c| c.into()).collect())
    }

    async fn find_by_vault(
        &self,
        vault_id: &ID,
        active_only: bool,
    ) -> anyhow::Result<Vec<NotificationChannel>> {
        let raws: Vec<NotificationChannelRaw> = sqlx::query_as(
            r#"
            SELECT c.* FROM notification_channels AS c
            INNER JOIN vault_memberships AS m
                ON m.user_uid = c.user_uid
            WHERE m.vault_uid = $1
            AND (NOT $2 OR (c.active AND c.verified_at IS NOT NULL))
            "#,
        )
        .bind(vault_id.inner_ref())
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find notification channels of vault: {:?} failed. DB returned error: {:?}",
                vault_id, e
            );
            e
        })?;
        Ok(raws.into_iter().map(|c| c.into()).collect())
    }

    async fn bump_fails(&self, channel_id: &ID) -> anyhow::Result<i32> {
        let fails: i32 = sqlx::query_scalar(
            r#"
            UPDATE notification_channels
            SET fails = fails + 1
            WHERE channel_uid = $1
            RETURNING fails
            "#,
        )
        .bind(channel_id.inner_ref())
        .fetch_one(&self.pool)
        .await?;
        Ok(fails)
    }

    async fn reset_fails(&self, channel_id: &ID) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notification_channels
            SET fails = 0
            WHERE channel_uid = $1
            "#,
        )
        .bind(channel_id.inner_ref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_active(&self, channel_id: &ID, active: bool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notification_channels
            SET active = $2
            WHERE channel_uid = $1
            "#,
        )
        .bind(channel_id.inner_ref())
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, channel_id: &ID) -> anyhow::Result<Option<NotificationChannel>> {
        // Scheduled instances are removed by the foreign key cascade
        let res: Option<NotificationChannelRaw> = sqlx::query_as(
            r#"
            DELETE FROM notification_channels
            WHERE channel_uid = $1
            RETURNING *
            "#,
        )
        .bind(channel_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(res.map(|channel| channel.into()))
    }
}
