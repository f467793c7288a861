use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::text::{non_blank, slugify};
use uuid::Uuid;

use super::product::Product;

/// A named, orderable grouping of products used to populate homepage sections.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Collection {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCollection {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCollection {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CollectionWithProducts {
    #[serde(flatten)]
    #[ts(flatten)]
    pub collection: Collection,
    pub products: Vec<Product>,
}

const COLUMNS: &str = "id, title, slug, description, is_active, sort_order, created_at, updated_at";

impl Collection {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM collections ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM collections WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM collections WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCollection) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.title));
        let sort_order = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM collections",
        )
        .fetch_one(pool)
        .await?;

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO collections (id, title, slug, description, is_active, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(slug)
        .bind(&data.description)
        .bind(data.is_active.unwrap_or(true))
        .bind(sort_order)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCollection,
    ) -> Result<Self, sqlx::Error> {
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.title));

        sqlx::query_as::<_, Self>(&format!(
            "UPDATE collections
             SET title = $2, slug = $3, description = $4, is_active = $5,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(slug)
        .bind(&data.description)
        .bind(data.is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM collections WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn reorder(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let mut affected = 0;
        let mut tx = pool.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE collections SET sort_order = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
            )
            .bind(id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }

    /// Products linked to the collection, in link-position order.
    pub async fn products(pool: &SqlitePool, collection_id: Uuid) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            "SELECT p.id, p.category_id, p.name, p.slug, p.description, p.price_cents, p.stock,
                    p.image_path, p.is_active, p.is_featured, p.sort_order, p.created_at, p.updated_at
             FROM products p
             JOIN collection_products cp ON cp.product_id = p.id
             WHERE cp.collection_id = $1
             ORDER BY cp.position ASC",
        )
        .bind(collection_id)
        .fetch_all(pool)
        .await
    }

    pub async fn with_products(
        pool: &SqlitePool,
        collection: Collection,
    ) -> Result<CollectionWithProducts, sqlx::Error> {
        let products = Self::products(pool, collection.id).await?;
        Ok(CollectionWithProducts {
            collection,
            products,
        })
    }

    /// Remove every link row for a collection. Callers run this inside the
    /// same transaction as the follow-up inserts.
    pub async fn clear_products<'e, E>(executor: E, collection_id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM collection_products WHERE collection_id = $1")
            .bind(collection_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn link_product<'e, E>(
        executor: E,
        collection_id: Uuid,
        product_id: Uuid,
        position: i64,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO collection_products (collection_id, product_id, position) VALUES ($1, $2, $3)",
        )
        .bind(collection_id)
        .bind(product_id)
        .bind(position)
        .execute(executor)
        .await?;
        Ok(())
    }
}
