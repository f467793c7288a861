use anyhow::Context;
use db::{DBService, models::homepage_component::HomepageComponent};
use server::{AppState, config::ServerConfig, routes};
use services::services::{discount_expiry::DiscountExpiryService, image_store::ImageStore};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = ServerConfig::from_env();

    let db = DBService::new(&config.database_url)
        .await
        .context("failed to open database")?;
    HomepageComponent::ensure_defaults(&db.pool)
        .await
        .context("failed to seed homepage components")?;

    let images = ImageStore::new(config.images_dir.clone())
        .await
        .context("failed to prepare image store")?;

    DiscountExpiryService::spawn(db.clone()).await;

    let state = AppState {
        db,
        images,
        config: config.clone(),
    };

    let app = routes::router(state)
        .nest_service("/images", ServeDir::new(&config.images_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    info!(addr = %listener.local_addr()?, "storefront server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("shutdown signal received");
}
