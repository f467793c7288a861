use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::category::{Category, CreateCategory, UpdateCategory};
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use super::ReorderRequest;
use crate::{AppState, error::ApiError};

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = Category::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let category = Category::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCategory>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    if non_blank(Some(payload.name.clone())).is_none() {
        return Err(ApiError::UnprocessableEntity("name is required".to_string()));
    }

    let category = Category::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCategory>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    if non_blank(Some(payload.name.clone())).is_none() {
        return Err(ApiError::UnprocessableEntity("name is required".to_string()));
    }

    let category = Category::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Category::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/categories/reorder
pub async fn reorder_categories(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let affected = Category::reorder(&state.db.pool, &payload.ordered_ids).await?;
    Ok(ResponseJson(ApiResponse::success(affected)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/categories",
        Router::new()
            .route("/", get(list_categories).post(create_category))
            .route("/reorder", put(reorder_categories))
            .route(
                "/{id}",
                get(get_category).put(update_category).delete(delete_category),
            ),
    )
}
