//! Filebox - multi-tenant file storage API.
//!
//! Users authenticate with session tokens, upload folders, files and images
//! into a per-user hierarchy, choose what is public, and read content back.
//! Image uploads are thumbnailed asynchronously by a queue worker.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod thumbnail;
pub mod web;

pub use auth::{
    hash_password, parse_basic_credentials, register, verify_password, PasswordError,
    RegistrationRequest, SessionStore,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{FileboxError, Result, ValidationError};
pub use file::{can_read, BlobStore, FileCatalog, FileEntry, FileType, NewUpload, ParentRef};
pub use thumbnail::{
    ChannelJobQueue, JobQueue, SqliteJobQueue, ThumbnailJob, ThumbnailWorker, THUMBNAIL_WIDTHS,
};
pub use web::{AppState, WebServer};
