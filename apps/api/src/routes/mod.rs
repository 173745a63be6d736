pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::optimize::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Optimize API
        .route("/api/v1/optimize", post(handlers::handle_optimize_upload))
        .route("/api/v1/optimize/text", post(handlers::handle_optimize_text))
        // Path used by the existing web client
        .route("/optimize", post(handlers::handle_optimize_upload))
        // History API
        .route("/api/v1/history", get(handlers::handle_history))
        .layer(body_limit)
        .with_state(state)
}
