use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct HeroSlide {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_path: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateHeroSlide {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_path: String,
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateHeroSlide {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_path: String,
    pub link_url: Option<String>,
    pub is_active: bool,
}

const COLUMNS: &str =
    "id, title, subtitle, image_path, link_url, is_active, display_order, created_at, updated_at";

impl HeroSlide {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM hero_slides ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM hero_slides
             WHERE is_active = 1
             ORDER BY display_order ASC, created_at ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM hero_slides WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateHeroSlide) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let display_order = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM hero_slides",
        )
        .fetch_one(pool)
        .await?;

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO hero_slides (id, title, subtitle, image_path, link_url, is_active, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.subtitle)
        .bind(&data.image_path)
        .bind(&data.link_url)
        .bind(data.is_active.unwrap_or(true))
        .bind(display_order)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateHeroSlide,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE hero_slides
             SET title = $2, subtitle = $3, image_path = $4, link_url = $5, is_active = $6,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.subtitle)
        .bind(&data.image_path)
        .bind(&data.link_url)
        .bind(data.is_active)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM hero_slides WHERE id = $1")
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
                "UPDATE hero_slides SET display_order = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
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
}
