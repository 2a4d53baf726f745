use super::IReminderRepo;
use chrono::{DateTime, Utc};
use kinfolk_domain::{Reminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    contact_uid: Uuid,
    important_date_uid: Option<Uuid>,
    label: String,
    day: Option<i32>,
    month: Option<i32>,
    year: Option<i32>,
    calendar_type: String,
    original_day: Option<i32>,
    original_month: Option<i32>,
    original_year: Option<i32>,
    reminder_type: String,
    frequency_number: i32,
    last_triggered_at: Option<DateTime<Utc>>,
    number_times_triggered: i64,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = anyhow::Error;

    fn try_from(e: ReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: e.reminder_uid.into(),
            contact_id: e.contact_uid.into(),
            important_date_id: e.important_date_uid.map(|id| id.into()),
            label: e.label,
            day: e.day.map(|d| d as u32),
            month: e.month.map(|m| m as u32),
            year: e.year,
            calendar_type: e.calendar_type,
            original_day: e.original_day.map(|d| d as u32),
            original_month: e.original_month.map(|m| m as u32),
            original_year: e.original_year,
            reminder_type: e.reminder_type.parse()?,
            frequency_number: e.frequency_number.max(1) as u32,
            last_triggered_at: e.last_triggered_at,
            number_times_triggered: e.number_times_triggered,
        })
    }
}

fn into_reminders(raws: Vec<ReminderRaw>) -> anyhow::Result<Vec<Reminder>> {
    raws.into_iter().map(Reminder::try_from).collect()
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders(
                reminder_uid, contact_uid, important_date_uid, label, day, month, year,
                calendar_type, original_day, original_month, original_year,
                reminder_type, frequency_number, last_triggered_at, number_times_triggered
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.contact_id.inner_ref())
        .bind(reminder.important_date_id.as_ref().map(|id| *id.inner_ref()))
        .bind(&reminder.label)
        .bind(reminder.day.map(|d| d as i32))
        .bind(reminder.month.map(|m| m as i32))
        .bind(reminder.year)
        .bind(&reminder.calendar_type)
        .bind(reminder.original_day.map(|d| d as i32))
        .bind(reminder.original_month.map(|m| m as i32))
        .bind(reminder.original_year)
        .bind(reminder.reminder_type.as_str())
        .bind(i32::try_from(reminder.frequency_number)?)
        .bind(reminder.last_triggered_at)
        .bind(reminder.number_times_triggered)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET label = $2,
            day = $3,
            month = $4,
            year = $5,
            calendar_type = $6,
            original_day = $7,
            original_month = $8,
            original_year = $9,
            reminder_type = $10,
            frequency_number = $11
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(&reminder.label)
        .bind(reminder.day.map(|d| d as i32))
        .bind(reminder.month.map(|m| m as i32))
        .bind(reminder.year)
        .bind(&reminder.calendar_type)
        .bind(reminder.original_day.map(|d| d as i32))
        .bind(reminder.original_month.map(|m| m as i32))
        .bind(reminder.original_year)
        .bind(reminder.reminder_type.as_str())
        .bind(i32::try_from(reminder.frequency_number)?)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        let res: Option<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find reminder with id: {:?} failed. DB returned error: {:?}",
                reminder_id, e
            );
            e
        })
        .ok()?;
        res.and_then(|reminder| reminder.try_into().ok())
    }

    async fn find_many(&self, reminder_ids: &[ID]) -> anyhow::Result<Vec<Reminder>> {
        let ids = reminder_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();
        let raws: Vec<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE reminder_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find reminders with ids: {:?} failed. DB returned error: {:?}",
                reminder_ids, e
            );
            e
        })?;
        into_reminders(raws)
    }

    async fn find_by_important_date(&self, important_date_id: &ID) -> Option<Reminder> {
        let res: Option<ReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminders
            WHERE important_date_uid = $1
            "#,
        )
        .bind(important_date_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find reminder with important date id: {:?} failed. DB returned error: {:?}",
                important_date_id, e
            );
            e
        })
        .ok()?;
        res.and_then(|reminder| reminder.try_into().ok())
    }

    async fn delete(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            DELETE FROM scheduled_instances
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .execute(&mut *tx)
        .await?;
        let res: Option<ReminderRaw> = sqlx::query_as(
            r#"
            DELETE FROM reminders
            WHERE reminder_uid = $1
            RETURNING *
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            error!(
                "Delete reminder with id: {:?} failed. DB returned error: {:?}",
                reminder_id, e
            );
            e
        })?;
        tx.commit().await?;
        res.map(Reminder::try_from).transpose()
    }

    async fn increment_trigger_counter(
        &self,
        reminder_id: &ID,
        triggered_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET last_triggered_at = $2,
            number_times_triggered = number_times_triggered + 1
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(triggered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
