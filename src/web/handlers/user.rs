//! User handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::AppState;
use crate::auth::register;
use crate::web::dto::{ApiResponse, JsonBody, RegisterRequest, UserResponse};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /users - register a new user.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = register(&state.users(), req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UserResponse::from(&user))),
    ))
}

/// GET /users/me - the user behind the session token.
pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    // Sessions outlive user rows; a dangling one is treated as logged out.
    let user = state
        .users()
        .get_by_id(user.user_id)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(ApiResponse::new(UserResponse::from(&user))))
}
