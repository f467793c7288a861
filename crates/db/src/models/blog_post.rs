use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::text::{non_blank, slugify};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_path: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateBlogPost {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateBlogPost {
    pub title: String,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_path: Option<String>,
}

const COLUMNS: &str = "id, title, slug, excerpt, body, cover_image_path, is_published, published_at, created_at, updated_at";

impl BlogPost {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_published(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts
             WHERE is_published = 1
             ORDER BY published_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM blog_posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_published_by_slug(
        pool: &SqlitePool,
        slug: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE slug = $1 AND is_published = 1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateBlogPost) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.title));

        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO blog_posts (id, title, slug, excerpt, body, cover_image_path)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(slug)
        .bind(&data.excerpt)
        .bind(&data.body)
        .bind(&data.cover_image_path)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBlogPost,
    ) -> Result<Self, sqlx::Error> {
        let slug = non_blank(data.slug.clone()).unwrap_or_else(|| slugify(&data.title));

        sqlx::query_as::<_, Self>(&format!(
            "UPDATE blog_posts
             SET title = $2, slug = $3, excerpt = $4, body = $5, cover_image_path = $6,
                 updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.title)
        .bind(slug)
        .bind(&data.excerpt)
        .bind(&data.body)
        .bind(&data.cover_image_path)
        .fetch_one(pool)
        .await
    }

    /// Publishing stamps `published_at` on the first publish only; the
    /// original timestamp survives unpublish/republish cycles.
    pub async fn set_published(
        pool: &SqlitePool,
        id: Uuid,
        published: bool,
    ) -> Result<Self, sqlx::Error> {
        if published {
            sqlx::query_as::<_, Self>(&format!(
                "UPDATE blog_posts
                 SET is_published = 1,
                     published_at = COALESCE(published_at, datetime('now', 'subsec')),
                     updated_at = datetime('now', 'subsec')
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            ))
            .bind(id)
            .fetch_one(pool)
            .await
        } else {
            sqlx::query_as::<_, Self>(&format!(
                "UPDATE blog_posts
                 SET is_published = 0, updated_at = datetime('now', 'subsec')
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            ))
            .bind(id)
            .fetch_one(pool)
            .await
        }
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn test_publish_keeps_original_timestamp() {
        let db = DBService::new_in_memory().await.unwrap();

        let post = BlogPost::create(
            &db.pool,
            &CreateBlogPost {
                title: "Harvest Notes".to_string(),
                slug: None,
                excerpt: None,
                body: "First pressing of the season.".to_string(),
                cover_image_path: None,
            },
        )
        .await
        .unwrap();

        assert!(!post.is_published);
        assert!(post.published_at.is_none());

        let published = BlogPost::set_published(&db.pool, post.id, true).await.unwrap();
        let first_stamp = published.published_at.unwrap();

        let unpublished = BlogPost::set_published(&db.pool, post.id, false).await.unwrap();
        assert!(!unpublished.is_published);
        assert_eq!(unpublished.published_at, Some(first_stamp));

        let republished = BlogPost::set_published(&db.pool, post.id, true).await.unwrap();
        assert_eq!(republished.published_at, Some(first_stamp));
    }

    #[tokio::test]
    async fn test_published_by_slug_hides_drafts() {
        let db = DBService::new_in_memory().await.unwrap();

        BlogPost::create(
            &db.pool,
            &CreateBlogPost {
                title: "Draft Post".to_string(),
                slug: None,
                excerpt: None,
                body: "wip".to_string(),
                cover_image_path: None,
            },
        )
        .await
        .unwrap();

        let found = BlogPost::find_published_by_slug(&db.pool, "draft-post").await.unwrap();
        assert!(found.is_none());
    }
}
