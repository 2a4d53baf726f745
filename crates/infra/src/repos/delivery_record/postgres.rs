use super::IDeliveryRecordRepo;
use chrono::{DateTime, Utc};
use kinfolk_domain::{DeliveryRecord, ScheduledInstance, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresDeliveryRecordRepo {
    pool: PgPool,
}

impl PostgresDeliveryRecordRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeliveryRecordRaw {
    record_uid: Uuid,
    channel_uid: Uuid,
    sent_at: DateTime<Utc>,
    subject: String,
    payload: String,
    error: Option<String>,
}

impl From<DeliveryRecordRaw> for DeliveryRecord {
    fn from(e: DeliveryRecordRaw) -> Self {
        Self {
            id: e.record_uid.into(),
            channel_id: e.channel_uid.into(),
            sent_at: e.sent_at,
            subject: e.subject,
            payload: e.payload,
            error: e.error,
        }
    }
}

const INSERT_RECORD: &str = r#"
    INSERT INTO delivery_records(record_uid, channel_uid, sent_at, subject, payload, error)
    VALUES($1, $2, $3, $4, $5, $6)
"#;

#[async_trait::async_trait]
impl IDeliveryRecordRepo for PostgresDeliveryRecordRepo {
    async fn insert(&self, record: &DeliveryRecord) -> anyhow::Result<()> {
        sqlx::query(INSERT_RECORD)
            .bind(record.id.inner_ref())
            .bind(record.channel_id.inner_ref())
            .bind(record.sent_at)
            .bind(&record.subject)
            .bind(&record.payload)
            .bind(&record.error)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Unable to insert delivery record: {:?}. DB returned error: {:?}",
                    record, e
                );
                e
            })?;
        Ok(())
    }

    async fn find_by_channel(
        &self,
        channel_id: &ID,
        limit: usize,
    ) -> anyhow::Result<Vec<DeliveryRecord>> {
        let raws: Vec<DeliveryRecordRaw> = sqlx::query_as(
            r#"
            SELECT * FROM delivery_records
            WHERE channel_uid = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(channel_id.inner_ref())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find delivery records for channel: {:?} failed. DB returned error: {:?}",
                channel_id, e
            );
            e
        })?;
        Ok(raws.into_iter().map(|r| r.into()).collect())
    }

    async fn record_success(
        &self,
        record: &DeliveryRecord,
        instance: &ScheduledInstance,
    ) -> anyhow::Result<()> {
        self.apply_success(record, instance).await.map_err(|e| {
            error!(
                "Unable to record delivery: {:?} of instance: {:?}. Error: {:?}",
                record, instance, e
            );
            e
        })
    }
}

impl PostgresDeliveryRecordRepo {
    async fn apply_success(
        &self,
        record: &DeliveryRecord,
        instance: &ScheduledInstance,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        // The instance has to go from pending to delivered, otherwise nothing is stored
        let marked = sqlx::query(
            r#"
            UPDATE scheduled_instances
            SET triggered_at = $2
            WHERE instance_uid = $1 AND triggered_at IS NULL
            "#,
        )
        .bind(instance.id.inner_ref())
        .bind(record.sent_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if marked != 1 {
            anyhow::bail!("Scheduled instance: {} is not pending", instance.id);
        }

        sqlx::query(INSERT_RECORD)
            .bind(record.id.inner_ref())
            .bind(record.channel_id.inner_ref())
            .bind(record.sent_at)
            .bind(&record.subject)
            .bind(&record.payload)
            .bind(&record.error)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE notification_channels
            SET fails = 0
            WHERE channel_uid = $1 AND fails > 0
            "#,
        )
        .bind(record.channel_id.inner_ref())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE reminders
            SET last_triggered_at = $2,
            number_times_triggered = number_times_triggered + 1
            WHERE reminder_uid = $1
            "#,
        )
        .bind(instance.reminder_id.inner_ref())
        .bind(record.sent_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
