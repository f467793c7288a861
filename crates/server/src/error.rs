use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    catalog::CatalogError, homepage::HomepageError, image_store::ImageStoreError,
    order_flow::OrderFlowError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    OrderFlow(#[from] OrderFlowError),
    #[error(transparent)]
    Homepage(#[from] HomepageError),
    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("resource not found")]
    NotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::Catalog(CatalogError::ProductNotFound)
            | ApiError::Catalog(CatalogError::CollectionNotFound) => StatusCode::NOT_FOUND,
            ApiError::Catalog(CatalogError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::OrderFlow(e) => match e {
                OrderFlowError::OrderNotFound
                | OrderFlowError::ProductNotFound
                | OrderFlowError::VariantNotFound
                | OrderFlowError::CustomerNotFound => StatusCode::NOT_FOUND,
                OrderFlowError::InvalidTransition { .. }
                | OrderFlowError::EmptyOrder
                | OrderFlowError::InvalidQuantity
                | OrderFlowError::ItemMissingSnapshot
                | OrderFlowError::UnknownDiscountCode(_)
                | OrderFlowError::DiscountNotApplicable(_) => StatusCode::UNPROCESSABLE_ENTITY,
                OrderFlowError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ApiError::Homepage(HomepageError::ComponentNotFound)
            | ApiError::Homepage(HomepageError::CollectionNotFound) => StatusCode::NOT_FOUND,
            ApiError::Homepage(HomepageError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::ImageStore(e) => match e {
                ImageStoreError::UnsupportedType(_)
                | ImageStoreError::Empty
                | ImageStoreError::InvalidPath => StatusCode::UNPROCESSABLE_ENTITY,
                ImageStoreError::NotFound => StatusCode::NOT_FOUND,
                ImageStoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match status {
            StatusCode::CONFLICT => "a row with this unique value already exists".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                error!(error = %self, "request failed");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
