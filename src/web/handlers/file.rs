//! File catalog handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::AppState;
use crate::error::ValidationError;
use crate::file::{ensure_readable, FileType, ParentRef};
use crate::thumbnail::parse_size;
use crate::web::dto::{ApiResponse, DataQuery, FileResponse, JsonBody, ListQuery, UploadRequest};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Non-numeric ids cannot exist, so they are simply not found.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found())
}

/// POST /files - create a folder, file or image.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    JsonBody(req): JsonBody<UploadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let entry = state.catalog.create(user.user_id, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(FileResponse::from(&entry))),
    ))
}

/// GET /files/:id - one entry's metadata.
pub async fn show(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let entry = state.catalog.get(parse_id(&id)?).await?;
    let entry = ensure_readable(entry, Some(user.user_id))?;
    Ok(Json(ApiResponse::new(FileResponse::from(&entry))))
}

/// GET /files - one page of the caller's entries.
pub async fn index(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    // An unparseable parent matches nothing.
    let Ok(parent) = ParentRef::parse(query.parent_id.as_deref()) else {
        return Ok(Json(ApiResponse::new(Vec::new())));
    };

    let entries = state
        .catalog
        .list(user.user_id, parent, query.page())
        .await?;
    Ok(Json(ApiResponse::new(
        entries.iter().map(FileResponse::from).collect(),
    )))
}

/// PUT /files/:id/publish
pub async fn publish(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    set_visibility(&state, user.user_id, &id, true).await
}

/// PUT /files/:id/unpublish
pub async fn unpublish(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    set_visibility(&state, user.user_id, &id, false).await
}

async fn set_visibility(
    state: &AppState,
    user_id: i64,
    id: &str,
    is_public: bool,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let entry = state
        .catalog
        .set_visibility(user_id, parse_id(id)?, is_public)
        .await?;
    Ok(Json(ApiResponse::new(FileResponse::from(&entry))))
}

/// GET /files/:id/data - raw content, or a thumbnail with `?size=`.
///
/// Open to anonymous callers for public entries.
pub async fn file_data(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(requester): OptionalAuthUser,
    Path(id): Path<String>,
    Query(query): Query<DataQuery>,
) -> Result<Response, ApiError> {
    let entry = state.catalog.get(parse_id(&id)?).await?;
    let entry = ensure_readable(entry, requester)?;

    if entry.file_type == FileType::Folder {
        return Err(ValidationError::FolderHasNoContent.into());
    }
    let width = parse_size(query.size.as_deref())?;

    let blob = state.catalog.read_content(&entry, width).await?;
    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes).into_response())
}
