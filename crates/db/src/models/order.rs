use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, QueryBuilder, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Legal moves for the status-transition call. Delivered and cancelled
    /// are terminal.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Shipped)
                | (Confirmed, Cancelled)
                | (Shipped, Delivered)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub discount_code: Option<String>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item snapshot. Name and unit price are frozen at order time so later
/// catalog edits do not rewrite history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct OrderEvent {
    pub id: Uuid,
    pub order_id: Uuid,
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OrderWithDetails {
    #[serde(flatten)]
    #[ts(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub events: Vec<OrderEvent>,
}

impl std::ops::Deref for OrderWithDetails {
    type Target = Order;
    fn deref(&self) -> &Self::Target {
        &self.order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateOrderItem {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    /// Required when no product or variant id is given.
    pub name: Option<String>,
    pub quantity: i64,
    /// Required when no product or variant id is given.
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateOrder {
    pub customer_id: Option<Uuid>,
    pub discount_code: Option<String>,
    pub shipping_address: Option<String>,
    pub note: Option<String>,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateOrder {
    pub shipping_address: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}

const COLUMNS: &str = "id, customer_id, status, total_cents, discount_code, shipping_address, note, created_at, updated_at";

impl Order {
    pub async fn list(pool: &SqlitePool, filter: &OrderFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM orders WHERE 1 = 1"));

        if let Some(status) = filter.status.clone() {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(customer_id) = filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<Self>().fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_details(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<OrderWithDetails>, sqlx::Error> {
        let Some(order) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let items = OrderItem::find_by_order_id(pool, id).await?;
        let events = OrderEvent::find_by_order_id(pool, id).await?;
        Ok(Some(OrderWithDetails {
            order,
            items,
            events,
        }))
    }

    /// Insert the bare order row. Items and the total are written by the
    /// order flow service inside the same transaction.
    pub async fn insert<'e, E>(executor: E, id: Uuid, data: &CreateOrder) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Self>(&format!(
            "INSERT INTO orders (id, customer_id, discount_code, shipping_address, note)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(data.customer_id)
        .bind(&data.discount_code)
        .bind(&data.shipping_address)
        .bind(&data.note)
        .fetch_one(executor)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateOrder,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "UPDATE orders
             SET shipping_address = $2, note = $3, updated_at = datetime('now', 'subsec')
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.shipping_address)
        .bind(&data.note)
        .fetch_one(pool)
        .await
    }

    pub async fn update_total<'e, E>(
        executor: E,
        id: Uuid,
        total_cents: i64,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "UPDATE orders SET total_cents = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .bind(total_cents)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_status<'e, E>(
        executor: E,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "UPDATE orders SET status = $2, updated_at = datetime('now', 'subsec') WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl OrderItem {
    pub async fn insert<'e, E>(
        executor: E,
        order_id: Uuid,
        product_id: Option<Uuid>,
        variant_id: Option<Uuid>,
        name: &str,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            "INSERT INTO order_items (id, order_id, product_id, variant_id, name, quantity, unit_price_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, order_id, product_id, variant_id, name, quantity, unit_price_cents",
        )
        .bind(id)
        .bind(order_id)
        .bind(product_id)
        .bind(variant_id)
        .bind(name)
        .bind(quantity)
        .bind(unit_price_cents)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_id(pool: &SqlitePool, order_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, order_id, product_id, variant_id, name, quantity, unit_price_cents
             FROM order_items
             WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}

impl OrderEvent {
    pub async fn create<'e, E>(
        executor: E,
        order_id: Uuid,
        from_status: Option<OrderStatus>,
        to_status: OrderStatus,
        note: Option<String>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Self>(
            "INSERT INTO order_events (id, order_id, from_status, to_status, note)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, order_id, from_status, to_status, note, created_at",
        )
        .bind(id)
        .bind(order_id)
        .bind(from_status)
        .bind(to_status)
        .bind(note)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_order_id(pool: &SqlitePool, order_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT id, order_id, from_status, to_status, note, created_at
             FROM order_events
             WHERE order_id = $1
             ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(&Confirmed));
        assert!(Pending.can_transition_to(&Cancelled));
        assert!(Confirmed.can_transition_to(&Shipped));
        assert!(Confirmed.can_transition_to(&Cancelled));
        assert!(Shipped.can_transition_to(&Delivered));

        assert!(!Pending.can_transition_to(&Shipped));
        assert!(!Shipped.can_transition_to(&Cancelled));
        assert!(!Delivered.can_transition_to(&Pending));
        assert!(!Cancelled.can_transition_to(&Confirmed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }
}
