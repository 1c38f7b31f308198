//! Router configuration for the Filebox API.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    connect, create_user, disconnect, file_data, index, me, publish, show, stats, status,
    unpublish, upload, AppState,
};
use super::middleware::create_cors_layer;

/// Create the API router.
///
/// `max_body_bytes` bounds request bodies; uploads arrive base64-encoded
/// inside JSON, so this is the effective upload limit.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/stats", get(stats))
        .route("/users", post(create_user))
        .route("/users/me", get(me))
        .route("/connect", get(connect))
        .route("/disconnect", get(disconnect))
        .route("/files", post(upload).get(index))
        .route("/files/:id", get(show))
        .route("/files/:id/publish", put(publish))
        .route("/files/:id/unpublish", put(unpublish))
        .route("/files/:id/data", get(file_data))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}
