use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Append-only record of notable admin-side actions (status transitions,
/// background sweeps).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct AdminActivityLog {
    pub id: Uuid,
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, entity, entity_id, action, detail, created_at";

impl AdminActivityLog {
    pub async fn create(
        pool: &SqlitePool,
        entity: &str,
        entity_id: Option<Uuid>,
        action: &str,
        detail: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO admin_activity_logs (id, entity, entity_id, action, detail)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(entity)
        .bind(entity_id)
        .bind(action)
        .bind(detail)
        .fetch_one(pool)
        .await
    }

    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM admin_activity_logs
             ORDER BY created_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
