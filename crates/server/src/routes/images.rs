use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::Json as ResponseJson,
    routing::post,
};
use serde::{Deserialize, Serialize};
use services::services::image_store::UploadedImage;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn default_kind() -> String {
    "misc".to_string()
}

/// Logical grouping for the upload ("products", "categories", ...). Becomes
/// the subdirectory under the image store root.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    #[serde(default = "default_kind")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DeleteImageRequest {
    pub path: String,
}

/// POST /api/images
///
/// Multipart upload; the image goes in a `file` field.
pub async fn upload_image(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<UploadedImage>>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .ok_or_else(|| {
                ApiError::UnprocessableEntity("file field needs a content type".to_string())
            })?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

        let stored = state.images.save(&params.kind, &content_type, &bytes).await?;
        return Ok(ResponseJson(ApiResponse::success(stored)));
    }

    Err(ApiError::UnprocessableEntity(
        "multipart body needs a file field".to_string(),
    ))
}

/// DELETE /api/images
pub async fn delete_image(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<DeleteImageRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.images.delete(&payload.path).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/images",
        Router::new()
            .route("/", post(upload_image).delete(delete_image))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}
