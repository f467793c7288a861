//! Order creation and the status-transition call.

use db::models::{
    activity_log::AdminActivityLog,
    customer::Customer,
    discount::{Discount, DiscountKind},
    order::{CreateOrder, Order, OrderEvent, OrderItem, OrderStatus, OrderWithDetails},
    product::Product,
    product_variant::ProductVariant,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use utils::text::non_blank;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("order not found")]
    OrderNotFound,
    #[error("invalid status transition: {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("order needs at least one item")]
    EmptyOrder,
    #[error("item quantity must be at least 1")]
    InvalidQuantity,
    #[error("item needs a name and unit price when no product is referenced")]
    ItemMissingSnapshot,
    #[error("product not found")]
    ProductNotFound,
    #[error("variant not found")]
    VariantNotFound,
    #[error("customer not found")]
    CustomerNotFound,
    #[error("unknown discount code: {0}")]
    UnknownDiscountCode(String),
    #[error("discount {0} cannot be applied to this order")]
    DiscountNotApplicable(String),
}

/// A resolved line item, ready to insert.
struct ItemSnapshot {
    product_id: Option<Uuid>,
    variant_id: Option<Uuid>,
    name: String,
    quantity: i64,
    unit_price_cents: i64,
}

pub struct OrderFlowService;

impl OrderFlowService {
    /// Create an order from the admin order-entry form. Line items referencing
    /// a product or variant snapshot their name and price from the catalog;
    /// free-form items must carry both. The order row, its items, the computed
    /// total, and the initial event are written in one transaction.
    pub async fn create_order(
        pool: &SqlitePool,
        data: &CreateOrder,
    ) -> Result<OrderWithDetails, OrderFlowError> {
        if data.items.is_empty() {
            return Err(OrderFlowError::EmptyOrder);
        }

        if let Some(customer_id) = data.customer_id {
            Customer::find_by_id(pool, customer_id)
                .await?
                .ok_or(OrderFlowError::CustomerNotFound)?;
        }

        let discount = match non_blank(data.discount_code.clone()) {
            Some(code) => Some(
                Discount::find_by_code(pool, &code)
                    .await?
                    .ok_or_else(|| OrderFlowError::UnknownDiscountCode(code.clone()))?,
            ),
            None => None,
        };

        let mut snapshots = Vec::with_capacity(data.items.len());
        for item in &data.items {
            if item.quantity < 1 {
                return Err(OrderFlowError::InvalidQuantity);
            }
            snapshots.push(Self::resolve_item(pool, item).await?);
        }

        let subtotal: i64 = snapshots
            .iter()
            .map(|s| s.quantity * s.unit_price_cents)
            .sum();
        let total_cents = match &discount {
            Some(discount) => Self::apply_discount(discount, subtotal)?,
            None => subtotal,
        };

        let order_id = Uuid::new_v4();
        let mut normalized = data.clone();
        normalized.discount_code = discount.as_ref().map(|d| d.code.clone());

        let mut tx = pool.begin().await?;
        let order = Order::insert(&mut *tx, order_id, &normalized).await?;
        for snapshot in &snapshots {
            OrderItem::insert(
                &mut *tx,
                order.id,
                snapshot.product_id,
                snapshot.variant_id,
                &snapshot.name,
                snapshot.quantity,
                snapshot.unit_price_cents,
            )
            .await?;
        }
        Order::update_total(&mut *tx, order.id, total_cents).await?;
        OrderEvent::create(
            &mut *tx,
            order.id,
            None,
            OrderStatus::Pending,
            Some("order created".to_string()),
        )
        .await?;
        if let Some(discount) = &discount {
            Discount::increment_usage(&mut *tx, discount.id).await?;
        }
        tx.commit().await?;

        info!(
            order_id = %order.id,
            items = snapshots.len(),
            total_cents = total_cents,
            "order created"
        );

        Order::find_with_details(pool, order.id)
            .await?
            .ok_or(OrderFlowError::OrderNotFound)
    }

    /// Move an order to a new status. Rejects moves the transition table does
    /// not allow, and appends an `order_events` row alongside the update.
    pub async fn transition(
        pool: &SqlitePool,
        order_id: Uuid,
        next: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderWithDetails, OrderFlowError> {
        let order = Order::find_by_id(pool, order_id)
            .await?
            .ok_or(OrderFlowError::OrderNotFound)?;

        if !order.status.can_transition_to(&next) {
            return Err(OrderFlowError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let mut tx = pool.begin().await?;
        Order::update_status(&mut *tx, order_id, next.clone()).await?;
        OrderEvent::create(&mut *tx, order_id, Some(order.status.clone()), next.clone(), note)
            .await?;
        tx.commit().await?;

        AdminActivityLog::create(
            pool,
            "order",
            Some(order_id),
            "status_changed",
            Some(
                serde_json::json!({
                    "from": order.status.to_string(),
                    "to": next.to_string(),
                })
                .to_string(),
            ),
        )
        .await?;

        info!(
            order_id = %order_id,
            from = %order.status,
            to = %next,
            "order status updated"
        );

        Order::find_with_details(pool, order_id)
            .await?
            .ok_or(OrderFlowError::OrderNotFound)
    }

    async fn resolve_item(
        pool: &SqlitePool,
        item: &db::models::order::CreateOrderItem,
    ) -> Result<ItemSnapshot, OrderFlowError> {
        if let Some(variant_id) = item.variant_id {
            let variant = ProductVariant::find_by_id(pool, variant_id)
                .await?
                .ok_or(OrderFlowError::VariantNotFound)?;
            let product = Product::find_by_id(pool, variant.product_id)
                .await?
                .ok_or(OrderFlowError::ProductNotFound)?;
            return Ok(ItemSnapshot {
                product_id: Some(product.id),
                variant_id: Some(variant.id),
                name: format!("{} ({})", product.name, variant.name),
                quantity: item.quantity,
                unit_price_cents: variant.price_cents,
            });
        }

        if let Some(product_id) = item.product_id {
            let product = Product::find_by_id(pool, product_id)
                .await?
                .ok_or(OrderFlowError::ProductNotFound)?;
            return Ok(ItemSnapshot {
                product_id: Some(product.id),
                variant_id: None,
                name: product.name,
                quantity: item.quantity,
                unit_price_cents: product.price_cents,
            });
        }

        match (non_blank(item.name.clone()), item.unit_price_cents) {
            (Some(name), Some(unit_price_cents)) => Ok(ItemSnapshot {
                product_id: None,
                variant_id: None,
                name,
                quantity: item.quantity,
                unit_price_cents,
            }),
            _ => Err(OrderFlowError::ItemMissingSnapshot),
        }
    }

    fn apply_discount(discount: &Discount, subtotal: i64) -> Result<i64, OrderFlowError> {
        if !discount.is_active {
            return Err(OrderFlowError::DiscountNotApplicable(discount.code.clone()));
        }
        if let Some(limit) = discount.usage_limit {
            if discount.times_used >= limit {
                return Err(OrderFlowError::DiscountNotApplicable(discount.code.clone()));
            }
        }
        if let Some(min) = discount.min_order_cents {
            if subtotal < min {
                return Err(OrderFlowError::DiscountNotApplicable(discount.code.clone()));
            }
        }

        let total = match discount.kind {
            DiscountKind::Percentage => subtotal - subtotal * discount.value / 100,
            DiscountKind::Fixed => subtotal - discount.value,
        };
        Ok(total.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use db::DBService;
    use db::models::discount::CreateDiscount;
    use db::models::order::CreateOrderItem;
    use db::models::product::CreateProduct;

    fn free_form_item(name: &str, quantity: i64, unit_price_cents: i64) -> CreateOrderItem {
        CreateOrderItem {
            product_id: None,
            variant_id: None,
            name: Some(name.to_string()),
            quantity,
            unit_price_cents: Some(unit_price_cents),
        }
    }

    fn order_of(items: Vec<CreateOrderItem>) -> CreateOrder {
        CreateOrder {
            customer_id: None,
            discount_code: None,
            shipping_address: None,
            note: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_create_order_computes_total_and_logs_event() {
        let db = DBService::new_in_memory().await.unwrap();

        let order = OrderFlowService::create_order(
            &db.pool,
            &order_of(vec![
                free_form_item("Gift wrap", 2, 150),
                free_form_item("Candle", 1, 900),
            ]),
        )
        .await
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 1200);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.events.len(), 1);
        assert_eq!(order.events[0].to_status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_order_snapshots_product_name_and_price() {
        let db = DBService::new_in_memory().await.unwrap();

        let product = Product::create(
            &db.pool,
            &CreateProduct {
                category_id: None,
                name: "Olive Oil".to_string(),
                slug: None,
                description: None,
                price_cents: 1250,
                stock: None,
                image_path: None,
                is_active: None,
                is_featured: None,
            },
        )
        .await
        .unwrap();

        let order = OrderFlowService::create_order(
            &db.pool,
            &order_of(vec![CreateOrderItem {
                product_id: Some(product.id),
                variant_id: None,
                name: None,
                quantity: 3,
                unit_price_cents: None,
            }]),
        )
        .await
        .unwrap();

        assert_eq!(order.items[0].name, "Olive Oil");
        assert_eq!(order.items[0].unit_price_cents, 1250);
        assert_eq!(order.total_cents, 3750);
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_and_incomplete_items() {
        let db = DBService::new_in_memory().await.unwrap();

        let empty = OrderFlowService::create_order(&db.pool, &order_of(vec![])).await;
        assert!(matches!(empty, Err(OrderFlowError::EmptyOrder)));

        let incomplete = OrderFlowService::create_order(
            &db.pool,
            &order_of(vec![CreateOrderItem {
                product_id: None,
                variant_id: None,
                name: Some("Mystery".to_string()),
                quantity: 1,
                unit_price_cents: None,
            }]),
        )
        .await;
        assert!(matches!(incomplete, Err(OrderFlowError::ItemMissingSnapshot)));
    }

    #[tokio::test]
    async fn test_percentage_discount_applied_and_usage_counted() {
        let db = DBService::new_in_memory().await.unwrap();

        let discount = Discount::create(
            &db.pool,
            &CreateDiscount {
                code: "welcome10".to_string(),
                kind: DiscountKind::Percentage,
                value: 10,
                min_order_cents: None,
                usage_limit: None,
                starts_at: None,
                ends_at: Some(Utc::now() + chrono::Duration::days(30)),
                is_active: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(discount.code, "WELCOME10");

        let mut create = order_of(vec![free_form_item("Hamper", 1, 10000)]);
        create.discount_code = Some("welcome10".to_string());

        let order = OrderFlowService::create_order(&db.pool, &create).await.unwrap();
        assert_eq!(order.total_cents, 9000);
        assert_eq!(order.discount_code, Some("WELCOME10".to_string()));

        let reloaded = Discount::find_by_id(&db.pool, discount.id).await.unwrap().unwrap();
        assert_eq!(reloaded.times_used, 1);
    }

    #[tokio::test]
    async fn test_transition_follows_table_and_appends_events() {
        let db = DBService::new_in_memory().await.unwrap();

        let order = OrderFlowService::create_order(
            &db.pool,
            &order_of(vec![free_form_item("Candle", 1, 900)]),
        )
        .await
        .unwrap();

        let skipped =
            OrderFlowService::transition(&db.pool, order.id, OrderStatus::Shipped, None).await;
        assert!(matches!(
            skipped,
            Err(OrderFlowError::InvalidTransition { .. })
        ));

        let confirmed =
            OrderFlowService::transition(&db.pool, order.id, OrderStatus::Confirmed, None)
                .await
                .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.events.len(), 2);
        assert_eq!(confirmed.events[1].from_status, Some(OrderStatus::Pending));

        let logs = AdminActivityLog::find_recent(&db.pool, 10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].entity, "order");
        assert_eq!(logs[0].action, "status_changed");
    }
}
