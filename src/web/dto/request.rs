//! Request DTOs for the Filebox API.
//!
//! Fields are optional so missing values reach the domain checks and get
//! their specific messages instead of a generic decode error.

use serde::Deserialize;
use serde_json::Value;

use crate::auth::RegistrationRequest;
use crate::file::NewUpload;

/// `POST /users` body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        RegistrationRequest {
            email: req.email,
            password: req.password,
        }
    }
}

/// `POST /files` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    /// Number or string; `0` means root.
    pub parent_id: Option<Value>,
    #[serde(default)]
    pub is_public: bool,
    /// Base64 content.
    pub data: Option<String>,
}

fn parent_wire_value(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<UploadRequest> for NewUpload {
    fn from(req: UploadRequest) -> Self {
        NewUpload {
            name: req.name,
            file_type: req.file_type,
            parent_id: parent_wire_value(req.parent_id),
            is_public: req.is_public,
            data: req.data,
        }
    }
}

/// `GET /files` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub parent_id: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Requested page; anything unparseable or negative is the first page.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(0)
            .max(0)
    }
}

/// `GET /files/:id/data` query.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    pub size: Option<String>,
}
