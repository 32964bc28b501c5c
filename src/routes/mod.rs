//! HTTP surface of the gateway

pub mod health;
pub mod process;
pub mod status;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // The framework body cap sits above our own limit so the structured
    // 413 always comes from the upload handler's size check.
    let body_limit = state.config().server.max_upload_bytes + 1024;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        .route("/uploadImage", post(upload::upload_image))
        .route("/queueStatus", get(status::queue_status))
        .route("/processImage/{request_id}", post(process::process_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
