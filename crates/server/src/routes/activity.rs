use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::activity_log::AdminActivityLog;
use serde::Deserialize;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// GET /api/activity
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<AdminActivityLog>>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let logs = AdminActivityLog::find_recent(&state.db.pool, limit).await?;
    Ok(ResponseJson(ApiResponse::success(logs)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/activity", get(list_activity))
}
