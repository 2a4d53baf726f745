use super::IScheduledInstanceRepo;
use chrono::{DateTime, Utc};
use kinfolk_domain::{ScheduledInstance, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresScheduledInstanceRepo {
    pool: PgPool,
}

impl PostgresScheduledInstanceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduledInstanceRaw {
    instance_uid: Uuid,
    reminder_uid: Uuid,
    channel_uid: Uuid,
    scheduled_at: DateTime<Utc>,
    triggered_at: Option<DateTime<Utc>>,
}

impl From<ScheduledInstanceRaw> for ScheduledInstance {
    fn from(e: ScheduledInstanceRaw) -> Self {
        Self {
            id: e.instance_uid.into(),
            reminder_id: e.reminder_uid.into(),
            channel_id: e.channel_uid.into(),
            scheduled_at: e.scheduled_at,
            triggered_at: e.triggered_at,
        }
    }
}

#[async_trait::async_trait]
impl IScheduledInstanceRepo for PostgresScheduledInstanceRepo {
    async fn enqueue(&self, instance: &ScheduledInstance) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO scheduled_instances(instance_uid, reminder_uid, channel_uid, scheduled_at, triggered_at)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (reminder_uid, channel_uid) WHERE triggered_at IS NULL DO NOTHING
            "#,
        )
        .bind(instance.id.inner_ref())
        .bind(instance.reminder_id.inner_ref())
        .bind(instance.channel_id.inner_ref())
        .bind(instance.scheduled_at)
        .bind(instance.triggered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to enqueue scheduled instance: {:?}. DB returned error: {:?}",
                instance, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn find(&self, instance_id: &ID) -> Option<ScheduledInstance> {
        let res: Option<ScheduledInstanceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM scheduled_instances
            WHERE instance_uid = $1
            "#,
        )
        .bind(instance_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find scheduled instance with id: {:?} failed. DB returned error: {:?}",
                instance_id, e
            );
            e
        })
        .ok()?;
        res.map(|instance| instance.into())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<ScheduledInstance>> {
        let raws: Vec<ScheduledInstanceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM scheduled_instances
            WHERE scheduled_at <= $1 AND triggered_at IS NULL
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find scheduled instances due at: {:?} failed. DB returned error: {:?}",
                now, e
            );
            e
        })?;
        Ok(raws.into_iter().map(|i| i.into()).collect())
    }

    async fn find_by_reminder(&self, reminder_id: &ID) -> anyhow::Result<Vec<ScheduledInstance>> {
        let raws: Vec<ScheduledInstanceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM scheduled_instances
            WHERE reminder_uid = $1
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(raws.into_iter().map(|i| i.into()).collect())
    }

    async fn mark_triggered(
        &self,
        instance_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_instances
            SET triggered_at = $2
            WHERE instance_uid = $1 AND triggered_at IS NULL
            "#,
        )
        .bind(instance_id.inner_ref())
        .bind(triggered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
