//! Session token extractors.
//!
//! Clients send the token from `GET /connect` in the `X-Token` header.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderName},
};

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Header carrying the session token.
pub static TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token");

fn token_from_parts(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(&TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

/// Extractor for authenticated users.
///
/// Rejects with 401 when the header is absent or the token does not resolve.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or_else(ApiError::unauthorized)?;
        let user_id = state
            .sessions
            .resolve(&token)
            .await?
            .ok_or_else(ApiError::unauthorized)?;

        Ok(AuthUser { user_id, token })
    }
}

/// Extractor for endpoints open to anonymous readers.
///
/// A missing or dead token yields `None` instead of a rejection.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<i64>);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts) else {
            return Ok(OptionalAuthUser(None));
        };
        Ok(OptionalAuthUser(state.sessions.resolve(&token).await?))
    }
}
