//! Login and logout handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};

use super::AppState;
use crate::web::dto::{ApiResponse, TokenResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// GET /connect - exchange Basic credentials for a session token.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = state.sessions.authenticate(header).await?;
    Ok(Json(ApiResponse::new(TokenResponse { token })))
}

/// GET /disconnect - revoke the caller's session token.
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    // A concurrent logout may already have removed it.
    if !state.sessions.revoke(&user.token).await? {
        return Err(ApiError::unauthorized());
    }
    tracing::info!(user_id = user.user_id, "User disconnected");
    Ok(StatusCode::NO_CONTENT)
}
