use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// The named homepage sections the storefront renders. Seeded once and then
/// only toggled, reordered, or pointed at a collection.
pub const DEFAULT_COMPONENTS: &[(&str, &str)] = &[
    ("hero", "Hero carousel"),
    ("featured_products", "Featured products"),
    ("category_grid", "Shop by category"),
    ("collection_spotlight", "Collection spotlight"),
    ("new_arrivals", "New arrivals"),
    ("blog_teaser", "From the journal"),
];

/// A row controlling whether a named homepage section is shown, its display
/// order, and an attached collection id.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct HomepageComponent {
    pub id: Uuid,
    pub component_key: String,
    pub title: String,
    pub is_visible: bool,
    pub display_order: i64,
    pub collection_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str =
    "id, component_key, title, is_visible, display_order, collection_id, created_at, updated_at";

impl HomepageComponent {
    /// Insert any missing default section rows. Idempotent; called at startup.
    pub async fn ensure_defaults(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        for (position, (key, title)) in DEFAULT_COMPONENTS.iter().enumerate() {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO homepage_components (id, component_key, title, display_order)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT(component_key) DO NOTHING",
            )
            .bind(id)
            .bind(key)
            .bind(title)
            .bind(position as i64)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM homepage_components ORDER BY display_order ASC, component_key ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_visible(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM homepage_components
             WHERE is_visible = 1
             ORDER BY display_order ASC, component_key ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM homepage_components WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_visibility(
        pool: &SqlitePool,
        id: Uuid,
        is_visible: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE homepage_components
             SET is_visible = $2, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(is_visible)
        .fetch_one(pool)
        .await
    }

    pub async fn set_collection(
        pool: &SqlitePool,
        id: Uuid,
        collection_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE homepage_components
             SET collection_id = $2, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(collection_id)
        .fetch_one(pool)
        .await
    }

    pub async fn reorder(pool: &SqlitePool, ordered_ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let mut affected = 0;
        let mut tx = pool.begin().await?;
        for (position, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE homepage_components SET display_order = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let db = DBService::new_in_memory().await.unwrap();

        HomepageComponent::ensure_defaults(&db.pool).await.unwrap();
        HomepageComponent::ensure_defaults(&db.pool).await.unwrap();

        let components = HomepageComponent::find_all(&db.pool).await.unwrap();
        assert_eq!(components.len(), DEFAULT_COMPONENTS.len());
        assert_eq!(components[0].component_key, "hero");
        assert_eq!(components[0].display_order, 0);
    }
}
