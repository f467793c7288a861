use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::homepage_component::HomepageComponent;
use serde::{Deserialize, Serialize};
use services::services::homepage::HomepageService;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::ReorderRequest;
use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetVisibilityRequest {
    pub is_visible: bool,
}

/// Attach a collection to the section slot, or detach with `null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetCollectionRequest {
    pub collection_id: Option<Uuid>,
}

/// GET /api/homepage-components
pub async fn list_components(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<HomepageComponent>>>, ApiError> {
    let components = HomepageComponent::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(components)))
}

/// PUT /api/homepage-components/{id}/visibility
pub async fn set_visibility(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetVisibilityRequest>,
) -> Result<ResponseJson<ApiResponse<HomepageComponent>>, ApiError> {
    let component =
        HomepageService::set_visibility(&state.db.pool, id, payload.is_visible).await?;
    Ok(ResponseJson(ApiResponse::success(component)))
}

/// PUT /api/homepage-components/{id}/collection
pub async fn set_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetCollectionRequest>,
) -> Result<ResponseJson<ApiResponse<HomepageComponent>>, ApiError> {
    let component =
        HomepageService::attach_collection(&state.db.pool, id, payload.collection_id).await?;
    Ok(ResponseJson(ApiResponse::success(component)))
}

/// PUT /api/homepage-components/reorder
pub async fn reorder_components(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let affected = HomepageService::reorder(&state.db.pool, &payload.ordered_ids).await?;
    Ok(ResponseJson(ApiResponse::success(affected)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/homepage-components",
        Router::new()
            .route("/", get(list_components))
            .route("/reorder", put(reorder_components))
            .route("/{id}/visibility", put(set_visibility))
            .route("/{id}/collection", put(set_collection)),
    )
}
