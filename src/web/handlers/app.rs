//! Service status handlers.

use std::sync::Arc;

use axum::{extract::State, Json};

use super::AppState;
use crate::web::dto::{ApiResponse, StatsResponse, StatusResponse};
use crate::web::error::ApiError;

/// GET /status - liveness of the catalog and session stores.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatusResponse>> {
    let db = state.db.ping().await;
    let sessions = state.sessions.ping().await;
    Json(ApiResponse::new(StatusResponse { db, sessions }))
}

/// GET /stats - number of users and catalog entries.
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let users = state.users().count().await?;
    let files = state.catalog.count().await?;
    Ok(Json(ApiResponse::new(StatsResponse { users, files })))
}
