use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A purchasable SKU-level child of a product (packaging, size, etc.) with its
/// own price and stock.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub is_default: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Variant fields as submitted by the product form. Used both for the
/// replace-all write and for single-variant updates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct VariantInput {
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: i64,
    pub stock: Option<i64>,
    pub is_default: Option<bool>,
}

const COLUMNS: &str =
    "id, product_id, name, sku, price_cents, stock, is_default, sort_order, created_at, updated_at";

impl ProductVariant {
    pub async fn find_by_product_id(
        pool: &SqlitePool,
        product_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM product_variants
             WHERE product_id = $1
             ORDER BY sort_order ASC, created_at ASC"
        ))
        .bind(product_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM product_variants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create<'e, E>(
        executor: E,
        product_id: Uuid,
        data: &VariantInput,
        sort_order: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO product_variants (id, product_id, name, sku, price_cents, stock, is_default, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(product_id)
        .bind(&data.name)
        .bind(&data.sku)
        .bind(data.price_cents)
        .bind(data.stock.unwrap_or(0))
        .bind(data.is_default.unwrap_or(false))
        .bind(sort_order)
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &VariantInput,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE product_variants
             SET name = $2, sku = $3, price_cents = $4, stock = $5, is_default = $6,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.sku)
        .bind(data.price_cents)
        .bind(data.stock.unwrap_or(0))
        .bind(data.is_default.unwrap_or(false))
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_product_id<'e, E>(
        executor: E,
        product_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
