use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    collection::{Collection, CreateCollection, UpdateCollection},
    product::Product,
};
use serde::{Deserialize, Serialize};
use services::services::catalog::CatalogService;
use ts_rs::TS;
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use super::ReorderRequest;
use crate::{AppState, error::ApiError};

/// Body for the membership rewrite: product ids in their new position order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SetCollectionProductsRequest {
    pub product_ids: Vec<Uuid>,
}

/// GET /api/collections
pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Collection>>>, ApiError> {
    let collections = Collection::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(collections)))
}

/// GET /api/collections/{id}
pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Collection>>, ApiError> {
    let collection = Collection::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(collection)))
}

/// POST /api/collections
pub async fn create_collection(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCollection>,
) -> Result<ResponseJson<ApiResponse<Collection>>, ApiError> {
    if non_blank(Some(payload.title.clone())).is_none() {
        return Err(ApiError::UnprocessableEntity("title is required".to_string()));
    }

    let collection = Collection::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(collection)))
}

/// PUT /api/collections/{id}
pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCollection>,
) -> Result<ResponseJson<ApiResponse<Collection>>, ApiError> {
    if non_blank(Some(payload.title.clone())).is_none() {
        return Err(ApiError::UnprocessableEntity("title is required".to_string()));
    }

    let collection = Collection::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(collection)))
}

/// DELETE /api/collections/{id}
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Collection::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/collections/reorder
pub async fn reorder_collections(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let affected = Collection::reorder(&state.db.pool, &payload.ordered_ids).await?;
    Ok(ResponseJson(ApiResponse::success(affected)))
}

/// GET /api/collections/{id}/products
pub async fn list_collection_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    Collection::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let products = Collection::products(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

/// PUT /api/collections/{id}/products
///
/// Replace the collection's membership with the submitted ordered product
/// ids.
pub async fn set_collection_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetCollectionProductsRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products =
        CatalogService::set_collection_products(&state.db.pool, id, &payload.product_ids).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/collections",
        Router::new()
            .route("/", get(list_collections).post(create_collection))
            .route("/reorder", put(reorder_collections))
            .route(
                "/{id}",
                get(get_collection)
                    .put(update_collection)
                    .delete(delete_collection),
            )
            .route(
                "/{id}/products",
                get(list_collection_products).put(set_collection_products),
            ),
    )
}
