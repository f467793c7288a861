use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "discount_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage of the order total (1-100).
    #[default]
    Percentage,
    /// `value` is an absolute amount in cents.
    Fixed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Discount {
    pub id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_order_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub times_used: i64,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDiscount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_order_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateDiscount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_order_cents: Option<i64>,
    pub usage_limit: Option<i64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

const COLUMNS: &str = "id, code, kind, value, min_order_cents, usage_limit, times_used, starts_at, ends_at, is_active, created_at, updated_at";

impl Discount {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM discounts ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM discounts WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM discounts WHERE code = $1"))
            .bind(code.trim().to_ascii_uppercase())
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateDiscount) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO discounts (id, code, kind, value, min_order_cents, usage_limit, starts_at, ends_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.code.trim().to_ascii_uppercase())
        .bind(&data.kind)
        .bind(data.value)
        .bind(data.min_order_cents)
        .bind(data.usage_limit)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateDiscount,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE discounts
             SET code = $2, kind = $3, value = $4, min_order_cents = $5, usage_limit = $6,
                 starts_at = $7, ends_at = $8, is_active = $9,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.code.trim().to_ascii_uppercase())
        .bind(&data.kind)
        .bind(data.value)
        .bind(data.min_order_cents)
        .bind(data.usage_limit)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn set_active(
        pool: &SqlitePool,
        id: Uuid,
        is_active: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE discounts
             SET is_active = $2, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn increment_usage<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "UPDATE discounts SET times_used = times_used + 1, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Active discounts whose end date has passed. Consumed by the expiry
    /// sweeper.
    pub async fn find_expired(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM discounts
             WHERE is_active = 1
               AND ends_at IS NOT NULL
               AND datetime(ends_at) <= datetime('now')
             ORDER BY ends_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
