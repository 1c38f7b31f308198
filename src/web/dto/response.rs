//! Response DTOs for the Filebox API.
//!
//! Each entity has exactly one mapping from its domain type.

use serde::Serialize;

use crate::db::User;
use crate::file::FileEntry;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Public view of a catalog entry. Root renders as `parentId: 0`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub is_public: bool,
    pub parent_id: i64,
}

impl From<&FileEntry> for FileResponse {
    fn from(entry: &FileEntry) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            name: entry.name.clone(),
            file_type: entry.file_type.as_str().to_string(),
            is_public: entry.is_public,
            parent_id: entry.parent.wire_id(),
        }
    }
}

/// `GET /connect` response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `GET /status` response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub db: bool,
    pub sessions: bool,
}

/// `GET /stats` response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: i64,
    pub files: i64,
}
