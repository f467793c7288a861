//! Public read-only surface: the same rows the admin screens manage, filtered
//! to what the storefront may show.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    blog_post::BlogPost,
    category::Category,
    product::{Product, ProductWithVariants},
};
use services::services::homepage::{HomePayload, HomepageService};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET /api/storefront/home
pub async fn home(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<HomePayload>>, ApiError> {
    let payload = HomepageService::home_payload(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(payload)))
}

/// GET /api/storefront/categories
pub async fn categories(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = Category::find_active(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

/// GET /api/storefront/categories/{slug}/products
pub async fn category_products(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let category = Category::find_by_slug(&state.db.pool, &slug)
        .await?
        .filter(|c| c.is_active)
        .ok_or(ApiError::NotFound)?;

    let products = Product::find_active_by_category_slug(&state.db.pool, &category.slug).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

/// GET /api/storefront/products/{slug}
pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<ProductWithVariants>>, ApiError> {
    let product = Product::find_by_slug(&state.db.pool, &slug)
        .await?
        .filter(|p| p.is_active)
        .ok_or(ApiError::NotFound)?;

    let detailed = Product::find_with_variants(&state.db.pool, product.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(detailed)))
}

/// GET /api/storefront/blog
pub async fn blog_index(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<BlogPost>>>, ApiError> {
    let posts = BlogPost::find_published(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

/// GET /api/storefront/blog/{slug}
pub async fn blog_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    let post = BlogPost::find_published_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/storefront",
        Router::new()
            .route("/home", get(home))
            .route("/categories", get(categories))
            .route("/categories/{slug}/products", get(category_products))
            .route("/products/{slug}", get(product_detail))
            .route("/blog", get(blog_index))
            .route("/blog/{slug}", get(blog_detail)),
    )
}
