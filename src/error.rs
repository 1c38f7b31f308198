//! Error types for Filebox.

use thiserror::Error;

/// Input problems reported back to the caller with a stable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or empty.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// The entry type is absent or not one of folder/file/image.
    #[error("Missing or invalid type")]
    InvalidType,

    /// The upload payload is not valid base64.
    #[error("Invalid data")]
    InvalidData,

    /// The parent reference does not resolve to an entry.
    #[error("Parent not found")]
    ParentNotFound,

    /// The parent reference resolves to a non-folder entry.
    #[error("Parent is not a folder")]
    ParentNotFolder,

    /// A user with the same email is already registered.
    #[error("Already exist")]
    AlreadyExists,

    /// Content was requested for a folder.
    #[error("A folder doesn't have content")]
    FolderHasNoContent,

    /// A thumbnail size outside the generated set was requested.
    #[error("Invalid size")]
    InvalidSize,
}

/// Common error type for Filebox.
#[derive(Error, Debug)]
pub enum FileboxError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid credentials or session token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Validation error for user input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found, or not readable by the requester.
    #[error("Not found")]
    NotFound,

    /// Image decoding or encoding failure.
    #[error("image error: {0}")]
    Image(String),

    /// Password hashing failure.
    #[error("password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Job queue failure.
    #[error("job queue error: {0}")]
    Queue(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for FileboxError {
    fn from(e: sqlx::Error) -> Self {
        FileboxError::Database(e.to_string())
    }
}

impl From<image::ImageError> for FileboxError {
    fn from(e: image::ImageError) -> Self {
        FileboxError::Image(e.to_string())
    }
}

/// Result type alias for Filebox operations.
pub type Result<T> = std::result::Result<T, FileboxError>;
