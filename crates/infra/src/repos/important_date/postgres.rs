use super::IImportantDateRepo;
use kinfolk_domain::{ImportantDate, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresImportantDateRepo {
    pool: PgPool,
}

impl PostgresImportantDateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ImportantDateRaw {
    important_date_uid: Uuid,
    contact_uid: Uuid,
    label: Option<String>,
    date_type: Option<String>,
    day: Option<i32>,
    month: Option<i32>,
    year: Option<i32>,
    calendar_type: Option<String>,
    original_day: Option<i32>,
    original_month: Option<i32>,
    original_year: Option<i32>,
    remind_me: bool,
}

impl From<ImportantDateRaw> for ImportantDate {
    fn from(e: ImportantDateRaw) -> Self {
        Self {
            id: e.important_date_uid.into(),
            contact_id: e.contact_uid.into(),
            label: e.label,
            date_type: e.date_type,
            day: e.day.map(|d| d as u32),
            month: e.month.map(|m| m as u32),
            year: e.year,
            calendar_type: e.calendar_type,
            original_day: e.original_day.map(|d| d as u32),
            original_month: e.original_month.map(|m| m as u32),
            original_year: e.original_year,
            remind_me: e.remind_me,
        }
    }
}

#[async_trait::async_trait]
impl IImportantDateRepo for PostgresImportantDateRepo {
    async fn insert(&self, date: &ImportantDate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO important_dates(
                important_date_uid, contact_uid, label, date_type, day, month, year,
                calendar_type, original_day, original_month, original_year, remind_me
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(date.id.inner_ref())
        .bind(date.contact_id.inner_ref())
        .bind(&date.label)
        .bind(&date.date_type)
        .bind(date.day.map(|d| d as i32))
        .bind(date.month.map(|m| m as i32))
        .bind(date.year)
        .bind(&date.calendar_type)
        .bind(date.original_day.map(|d| d as i32))
        .bind(date.original_month.map(|m| m as i32))
        .bind(date.original_year)
        .bind(date.remind_me)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert important date: {:?}. DB returned error: {:?}",
                date, e
            );
            e
        })?;
        Ok(())
    }

    async fn save(&self, date: &ImportantDate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE important_dates
            SET label = $2,
            date_type = $3,
            day = $4,
            month = $5,
            year = $6,
            calendar_type = $7,
            original_day = $8,
            original_month = $9,
            original_year = $10,
            remind_me = $11
            WHERE important_date_uid = $1
            "#,
        )
        .bind(date.id.inner_ref())
        .bind(&date.label)
        .bind(&date.date_type)
        .bind(date.day.map(|d| d as i32))
        .bind(date.month.map(|m| m as i32))
        .bind(date.year)
        .bind(&date.calendar_type)
        .bind(date.original_day.map(|d| d as i32))
        .bind(date.original_month.map(|m| m as i32))
        .bind(date.original_year)
        .bind(date.remind_me)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to save important date: {:?}. DB returned error: {:?}",
                date, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, important_date_id: &ID) -> Option<ImportantDate> {
        let res: Option<ImportantDateRaw> = sqlx::query_as(
            r#"
            SELECT * FROM important_dates
            WHERE important_date_uid = $1
            "#,
        )
        .bind(important_date_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find important date with id: {:?} failed. DB returned error: {:?}",
                important_date_id, e
            );
            e
        })
        .ok()?;
        res.map(|date| date.into())
    }

    async fn delete(&self, important_date_id: &ID) -> anyhow::Result<Option<ImportantDate>> {
        let res: Option<ImportantDateRaw> = sqlx::query_as(
            r#"
            DELETE FROM important_dates
            WHERE important_date_uid = $1
            RETURNING *
            "#,
        )
        .bind(important_date_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(res.map(|date| date.into()))
    }
}
