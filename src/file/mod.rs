//! File catalog module for Filebox.
//!
//! - Catalog records (folders, files, images) and their repository
//! - Blob storage on the local filesystem
//! - The read-access decision shared by every read path

pub mod access;
mod metadata;
mod service;
mod storage;

pub use access::{can_read, ensure_readable};
pub use metadata::{FileEntry, FileRepository, FileType, NewFileEntry, ParentRef, PAGE_SIZE};
pub use service::{FileCatalog, NewUpload};
pub use storage::{content_type_for, Blob, BlobStore};
