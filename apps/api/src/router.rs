use std::sync::Arc;

use axum::{routing::get, Router};

use consultation_cell::router::consultation_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Aram Clinic API is running!" }))
        .merge(consultation_routes(state))
}
