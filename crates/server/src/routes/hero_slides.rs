use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::hero_slide::{CreateHeroSlide, HeroSlide, UpdateHeroSlide};
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use super::ReorderRequest;
use crate::{AppState, error::ApiError};

fn validate_slide(title: &str, image_path: &str) -> Result<(), ApiError> {
    if non_blank(Some(title.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("title is required".to_string()));
    }
    if non_blank(Some(image_path.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity(
            "image is required".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/hero-slides
pub async fn list_slides(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<HeroSlide>>>, ApiError> {
    let slides = HeroSlide::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(slides)))
}

/// GET /api/hero-slides/{id}
pub async fn get_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<HeroSlide>>, ApiError> {
    let slide = HeroSlide::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(slide)))
}

/// POST /api/hero-slides
pub async fn create_slide(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateHeroSlide>,
) -> Result<ResponseJson<ApiResponse<HeroSlide>>, ApiError> {
    validate_slide(&payload.title, &payload.image_path)?;

    let slide = HeroSlide::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(slide)))
}

/// PUT /api/hero-slides/{id}
pub async fn update_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateHeroSlide>,
) -> Result<ResponseJson<ApiResponse<HeroSlide>>, ApiError> {
    validate_slide(&payload.title, &payload.image_path)?;

    let slide = HeroSlide::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(slide)))
}

/// DELETE /api/hero-slides/{id}
pub async fn delete_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = HeroSlide::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// PUT /api/hero-slides/reorder
pub async fn reorder_slides(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderRequest>,
) -> Result<ResponseJson<ApiResponse<u64>>, ApiError> {
    let affected = HeroSlide::reorder(&state.db.pool, &payload.ordered_ids).await?;
    Ok(ResponseJson(ApiResponse::success(affected)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/hero-slides",
        Router::new()
            .route("/", get(list_slides).post(create_slide))
            .route("/reorder", put(reorder_slides))
            .route(
                "/{id}",
                get(get_slide).put(update_slide).delete(delete_slide),
            ),
    )
}
