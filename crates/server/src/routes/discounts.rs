use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::discount::{CreateDiscount, Discount, DiscountKind, UpdateDiscount};
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn validate_discount(code: &str, kind: &DiscountKind, value: i64) -> Result<(), ApiError> {
    if non_blank(Some(code.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("code is required".to_string()));
    }
    match kind {
        DiscountKind::Percentage => {
            if !(1..=100).contains(&value) {
                return Err(ApiError::UnprocessableEntity(
                    "percentage value must be between 1 and 100".to_string(),
                ));
            }
        }
        DiscountKind::Fixed => {
            if value <= 0 {
                return Err(ApiError::UnprocessableEntity(
                    "fixed value must be a positive amount in cents".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// GET /api/discounts
pub async fn list_discounts(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Discount>>>, ApiError> {
    let discounts = Discount::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(discounts)))
}

/// GET /api/discounts/{id}
pub async fn get_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Discount>>, ApiError> {
    let discount = Discount::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(discount)))
}

/// POST /api/discounts
pub async fn create_discount(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateDiscount>,
) -> Result<ResponseJson<ApiResponse<Discount>>, ApiError> {
    validate_discount(&payload.code, &payload.kind, payload.value)?;

    let discount = Discount::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(discount)))
}

/// PUT /api/discounts/{id}
pub async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateDiscount>,
) -> Result<ResponseJson<ApiResponse<Discount>>, ApiError> {
    validate_discount(&payload.code, &payload.kind, payload.value)?;

    let discount = Discount::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(discount)))
}

/// DELETE /api/discounts/{id}
pub async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Discount::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/discounts/{id}/activate
pub async fn activate_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Discount>>, ApiError> {
    let discount = Discount::set_active(&state.db.pool, id, true).await?;
    Ok(ResponseJson(ApiResponse::success(discount)))
}

/// POST /api/discounts/{id}/deactivate
pub async fn deactivate_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Discount>>, ApiError> {
    let discount = Discount::set_active(&state.db.pool, id, false).await?;
    Ok(ResponseJson(ApiResponse::success(discount)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/discounts",
        Router::new()
            .route("/", get(list_discounts).post(create_discount))
            .route(
                "/{id}",
                get(get_discount)
                    .put(update_discount)
                    .delete(delete_discount),
            )
            .route("/{id}/activate", post(activate_discount))
            .route("/{id}/deactivate", post(deactivate_discount)),
    )
}
