pub mod activity;
pub mod blog_posts;
pub mod categories;
pub mod collections;
pub mod customers;
pub mod discounts;
pub mod health;
pub mod hero_slides;
pub mod homepage;
pub mod images;
pub mod orders;
pub mod products;
pub mod storefront;

use axum::Router;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::AppState;

/// Body of every drag-and-drop reorder call: row ids in their new display
/// order. Each row's sort index is rewritten to its position in this array.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<Uuid>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(activity::router())
        .merge(categories::router())
        .merge(products::router())
        .merge(collections::router())
        .merge(blog_posts::router())
        .merge(hero_slides::router())
        .merge(homepage::router())
        .merge(orders::router())
        .merge(customers::router())
        .merge(discounts::router())
        .merge(images::router())
        .merge(storefront::router());

    Router::new().nest("/api", api).with_state(state)
}
