pub mod config;
pub mod error;
pub mod routes;

use db::DBService;
use services::services::image_store::ImageStore;

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub images: ImageStore,
    pub config: ServerConfig,
}
