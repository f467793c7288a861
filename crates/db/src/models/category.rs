use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::text::{non_blank, slugify};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub is_active: bool,
}

const COLUMNS: &str =
    "id, name, slug, description, image_path, is_active, sort_order, created_at, updated_at";

impl Category {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE is_active = 1 ORDER BY sort_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM categories WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCategory) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.name));
        let sort_order = Self::next_sort_order(pool).await?;

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO categories (id, name, slug, description, image_path, is_active, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(slug)
        .bind(&data.description)
        .bind(&data.image_path)
        .bind(data.is_active.unwrap_or(true))
        .bind(sort_order)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCategory,
    ) -> Result<Self, sqlx::Error> {
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.name));

        sqlx::query_as::<_, Self>(&format!(
            "UPDATE categories
             SET name = $2, slug = $3, description = $4, image_path = $5, is_active = $6,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(slug)
        .bind(&data.description)
        .bind(&data.image_path)
        .bind(data.is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite `sort_order` so each row's index equals its position in the
    /// submitted array. Runs in a single transaction.
    pub async fn reorder(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let mut affected = 0;
        let mut tx = pool.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE categories SET sort_order = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
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

    async fn next_sort_order(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM categories",
        )
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn create_input(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            slug: None,
            description: None,
            image_path: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_derives_slug_and_appends_sort_order() {
        let db = DBService::new_in_memory().await.unwrap();

        let first = Category::create(&db.pool, &create_input("Fresh Produce"))
            .await
            .unwrap();
        let second = Category::create(&db.pool, &create_input("Tea & Coffee"))
            .await
            .unwrap();

        assert_eq!(first.slug, "fresh-produce");
        assert_eq!(second.slug, "tea-coffee");
        assert_eq!(first.sort_order, 0);
        assert_eq!(second.sort_order, 1);
        assert!(first.is_active);
    }

    #[tokio::test]
    async fn test_reorder_rewrites_indices() {
        let db = DBService::new_in_memory().await.unwrap();

        let a = Category::create(&db.pool, &create_input("A")).await.unwrap();
        let b = Category::create(&db.pool, &create_input("B")).await.unwrap();
        let c = Category::create(&db.pool, &create_input("C")).await.unwrap();

        let affected = Category::reorder(&db.pool, &[c.id, a.id, b.id]).await.unwrap();
        assert_eq!(affected, 3);

        let ordered: Vec<String> = Category::find_all(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|cat| cat.name)
            .collect();
        assert_eq!(ordered, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = DBService::new_in_memory().await.unwrap();

        let category = Category::create(&db.pool, &create_input("Pantry")).await.unwrap();
        let updated = Category::update(
            &db.pool,
            category.id,
            &UpdateCategory {
                name: "Pantry Staples".to_string(),
                slug: None,
                description: Some("Dry goods".to_string()),
                image_path: None,
                is_active: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.slug, "pantry-staples");
        assert!(!updated.is_active);

        let deleted = Category::delete(&db.pool, category.id).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(Category::find_by_id(&db.pool, category.id).await.unwrap().is_none());
    }
}
