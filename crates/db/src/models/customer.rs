use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use utils::text::non_blank;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCustomer {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateCustomer {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

const COLUMNS: &str = "id, email, full_name, phone, created_at, updated_at";

impl Customer {
    /// List customers, optionally narrowed by a substring match on email or
    /// name.
    pub async fn list(pool: &SqlitePool, q: Option<String>) -> Result<Vec<Self>, sqlx::Error> {
        match non_blank(q) {
            Some(q) => {
                let pattern = format!("%{q}%");
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {COLUMNS} FROM customers
                     WHERE email LIKE $1 OR full_name LIKE $1
                     ORDER BY created_at DESC"
                ))
                .bind(pattern)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(&format!(
                    "SELECT {COLUMNS} FROM customers ORDER BY created_at DESC"
                ))
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM customers WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM customers WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateCustomer) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO customers (id, email, full_name, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.email.trim().to_ascii_lowercase())
        .bind(&data.full_name)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCustomer,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE customers
             SET email = $2, full_name = $3, phone = $4, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.email.trim().to_ascii_lowercase())
        .bind(&data.full_name)
        .bind(&data.phone)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
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
    async fn test_email_normalized_and_unique() {
        let db = DBService::new_in_memory().await.unwrap();

        let customer = Customer::create(
            &db.pool,
            &CreateCustomer {
                email: "  Ana@Example.COM ".to_string(),
                full_name: "Ana Pereira".to_string(),
                phone: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(customer.email, "ana@example.com");

        let duplicate = Customer::create(
            &db.pool,
            &CreateCustomer {
                email: "ana@example.com".to_string(),
                full_name: "Someone Else".to_string(),
                phone: None,
            },
        )
        .await;
        let err = duplicate.unwrap_err();
        assert!(
            err.as_database_error()
                .map(|db_err| db_err.is_unique_violation())
                .unwrap_or(false)
        );
    }

    #[tokio::test]
    async fn test_list_search() {
        let db = DBService::new_in_memory().await.unwrap();

        for (email, name) in [
            ("ana@example.com", "Ana Pereira"),
            ("bo@example.com", "Bo Larsen"),
        ] {
            Customer::create(
                &db.pool,
                &CreateCustomer {
                    email: email.to_string(),
                    full_name: name.to_string(),
                    phone: None,
                },
            )
            .await
            .unwrap();
        }

        let hits = Customer::list(&db.pool, Some("larsen".to_string())).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "bo@example.com");
    }
}
