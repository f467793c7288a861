use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    product::{CreateProduct, Product, ProductFilter, ProductWithVariants, UpdateProduct},
    product_variant::{ProductVariant, VariantInput},
};
use serde::{Deserialize, Serialize};
use services::services::catalog::CatalogService;
use ts_rs::TS;
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use super::ReorderRequest;
use crate::{AppState, error::ApiError};

/// Body for the replace-all variants call: the full variant set as laid out
/// in the product form, in display order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReplaceVariantsRequest {
    pub variants: Vec<VariantInput>,
}

fn validate_product_fields(name: &str, price_cents: i64) -> Result<(), ApiError> {
    if non_blank(Some(name.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("name is required".to_string()));
    }
    if price_cents < 0 {
        return Err(ApiError::UnprocessableEntity(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn validate_variants(variants: &[VariantInput]) -> Result<(), ApiError> {
    for variant in variants {
        if non_blank(Some(variant.name.clone())).is_none() {
            return Err(ApiError::UnprocessableEntity(
                "variant name is required".to_string(),
            ));
        }
        if variant.price_cents < 0 {
            return Err(ApiError::UnprocessableEntity(
                "variant price must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = Product::list(&state.db.pool, &filter).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProductWithVariants>>, ApiError> {
    let product = Product::find_with_variants(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    validate_product_fields(&payload.name, payload.price_cents)?;

    let product = Product::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    validate_product_fields(&payload.name, payload.price_cents)?;

    let product = Product::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Product::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/products/reorder
pub async fn reorder_products(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let affected = Product::reorder(&state.db.pool, &payload.ordered_ids).await?;
    Ok(ResponseJson(ApiResponse::success(affected)))
}

/// GET /api/products/{id}/variants
pub async fn list_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ProductVariant>>>, ApiError> {
    Product::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let variants = ProductVariant::find_by_product_id(&state.db.pool, id).await?;
    Ok(ResponseJson(ApiResponse::success(variants)))
}

/// PUT /api/products/{id}/variants
///
/// Replace the product's variant set with the submitted one.
pub async fn replace_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ReplaceVariantsRequest>,
) -> Result<ResponseJson<ApiResponse<Vec<ProductVariant>>>, ApiError> {
    validate_variants(&payload.variants)?;

    let variants = CatalogService::replace_variants(&state.db.pool, id, &payload.variants).await?;
    Ok(ResponseJson(ApiResponse::success(variants)))
}

/// PUT /api/products/{id}/variants/{variant_id}
pub async fn update_variant(
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
    axum::Json(payload): axum::Json<VariantInput>,
) -> Result<ResponseJson<ApiResponse<ProductVariant>>, ApiError> {
    validate_variants(std::slice::from_ref(&payload))?;

    let variant = ProductVariant::find_by_id(&state.db.pool, variant_id)
        .await?
        .filter(|v| v.product_id == id)
        .ok_or(ApiError::NotFound)?;

    let updated = ProductVariant::update(&state.db.pool, variant.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

/// DELETE /api/products/{id}/variants/{variant_id}
pub async fn delete_variant(
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let variant = ProductVariant::find_by_id(&state.db.pool, variant_id)
        .await?
        .filter(|v| v.product_id == id)
        .ok_or(ApiError::NotFound)?;

    ProductVariant::delete(&state.db.pool, variant.id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/products",
        Router::new()
            .route("/", get(list_products).post(create_product))
            .route("/reorder", put(reorder_products))
            .route(
                "/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/{id}/variants", get(list_variants).put(replace_variants))
            .route(
                "/{id}/variants/{variant_id}",
                put(update_variant).delete(delete_variant),
            ),
    )
}
