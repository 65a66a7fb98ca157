pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        // Extraction API
        .route("/api/v1/extract", post(handlers::handle_extract))
        .route(
            "/api/v1/extract/upload",
            post(handlers::handle_extract_upload),
        )
        .route("/api/v1/keywords/rank", post(handlers::handle_rank))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
