use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use serde::Deserialize;
use utils::response::ApiResponse;
use utils::text::non_blank;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub q: Option<String>,
}

fn validate_customer(email: &str, full_name: &str) -> Result<(), ApiError> {
    if non_blank(Some(full_name.to_string())).is_none() {
        return Err(ApiError::UnprocessableEntity("name is required".to_string()));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::UnprocessableEntity(
            "a valid email is required".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Customer>>>, ApiError> {
    let customers = Customer::list(&state.db.pool, query.q).await?;
    Ok(ResponseJson(ApiResponse::success(customers)))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    let customer = Customer::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(customer)))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCustomer>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    validate_customer(&payload.email, &payload.full_name)?;

    let customer = Customer::create(&state.db.pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(customer)))
}

/// PUT /api/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCustomer>,
) -> Result<ResponseJson<ApiResponse<Customer>>, ApiError> {
    validate_customer(&payload.email, &payload.full_name)?;

    let customer = Customer::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(customer)))
}

/// DELETE /api/customers/{id}
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let deleted = Customer::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/customers",
        Router::new()
            .route("/", get(list_customers).post(create_customer))
            .route(
                "/{id}",
                get(get_customer)
                    .put(update_customer)
                    .delete(delete_customer),
            ),
    )
}
