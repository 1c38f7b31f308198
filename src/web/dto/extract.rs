//! Request body extraction.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::web::error::{ApiError, ErrorCode};

/// JSON body extractor whose rejection uses the API error shape.
///
/// ```ignore
/// async fn upload(JsonBody(req): JsonBody<UploadRequest>) -> Result<..., ApiError> {
///     // ...
/// }
/// ```
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::new(ErrorCode::PayloadTooLarge, "Request body too large")
            } else {
                ApiError::bad_request(format!("Invalid JSON: {}", e.body_text()))
            }
        })?;

        Ok(JsonBody(value))
    }
}
