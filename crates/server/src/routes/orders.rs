use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::order::{
    CreateOrder, Order, OrderFilter, OrderStatus, OrderWithDetails, UpdateOrder,
};
use serde::{Deserialize, Serialize};
use services::services::order_flow::OrderFlowService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Body of the status-transition call.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = Order::list(&state.db.pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(orders)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrderWithDetails>>, ApiError> {
    let order = Order::find_with_details(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateOrder>,
) -> Result<ResponseJson<ApiResponse<OrderWithDetails>>, ApiError> {
    let order = OrderFlowService::create_order(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// PUT /api/orders/{id}
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateOrder>,
) -> Result<ResponseJson<ApiResponse<Order>>, ApiError> {
    let order = Order::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

/// DELETE /api/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Order::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/orders/{id}/status
///
/// Move the order through its status flow. Illegal moves are rejected.
pub async fn transition_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<TransitionRequest>,
) -> Result<ResponseJson<ApiResponse<OrderWithDetails>>, ApiError> {
    let order =
        OrderFlowService::transition(&state.db.pool, id, payload.status, payload.note).await?;
    Ok(ResponseJson(ApiResponse::success(order)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/orders",
        Router::new()
            .route("/", get(list_orders).post(create_order))
            .route(
                "/{id}",
                get(get_order).put(update_order).delete(delete_order),
            )
            .route("/{id}/status", post(transition_order)),
    )
}
