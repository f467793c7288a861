use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::blog_post::{BlogPost, CreateBlogPost, UpdateBlogPost};
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn validate_post(title: &str, body: &str) -> Result<(), ApiError> {
    if non_blank(Some(title.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("title is required".to_string()));
    }
    if non_blank(Some(body.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("body is required".to_string()));
    }
    Ok(())
}

/// GET /api/blog-posts
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<BlogPost>>>, ApiError> {
    let posts = BlogPost::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

/// GET /api/blog-posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    let post = BlogPost::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// POST /api/blog-posts
pub async fn create_post(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    validate_post(&payload.title, &payload.body)?;

    let post = BlogPost::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// PUT /api/blog-posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    validate_post(&payload.title, &payload.body)?;

    let post = BlogPost::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// DELETE /api/blog-posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = BlogPost::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/blog-posts/{id}/publish
pub async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    let post = BlogPost::set_published(&state.db.pool, id, true).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// POST /api/blog-posts/{id}/unpublish
pub async fn unpublish_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    let post = BlogPost::set_published(&state.db.pool, id, false).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/blog-posts",
        Router::new()
            .route("/", get(list_posts).post(create_post))
            .route("/{id}", get(get_post).put(update_post).delete(delete_post))
            .route("/{id}/publish", post(publish_post))
            .route("/{id}/unpublish", post(unpublish_post)),
    )
}
