use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    // Summary persistence runs under the caller's row-level security.
    let protected_routes = Router::new()
        .route(
            "/consultations/sessions/{id}/summary",
            post(handlers::generate_session_summary),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // The chat itself is anonymous-friendly.
    Router::new()
        .route("/consultations/chat", post(handlers::consultation_chat))
        .merge(protected_routes)
        .with_state(state)
}
