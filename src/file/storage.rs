//! Blob storage for Filebox.
//!
//! Blobs live flat under one root directory, named by a random UUID.
//! Thumbnails sit next to their original as `<blob>_<width>`.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::thumbnail::THUMBNAIL_WIDTHS;
use crate::{FileboxError, Result};

/// Blob bytes together with the content type to serve them with.
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Infer a content type from an entry name.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a blob, or of one of its thumbnails when `width` is set.
    pub fn path_for(&self, blob_id: &str, width: Option<u32>) -> PathBuf {
        match width {
            Some(width) => self.root.join(format!("{blob_id}_{width}")),
            None => self.root.join(blob_id),
        }
    }

    /// Store bytes under a fresh UUID name.
    ///
    /// The root directory is created if missing. Existing files are never
    /// overwritten.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The decoded content to store
    ///
    /// # Returns
    ///
    /// The blob id, a name relative to the storage root
    pub async fn write(&self, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.root).await?;

        let blob_id = Uuid::new_v4().to_string();
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path_for(&blob_id, None))
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok(blob_id)
    }

    /// Store a thumbnail for an existing blob, replacing any earlier one.
    pub async fn write_derived(&self, blob_id: &str, width: u32, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.path_for(blob_id, Some(width)), bytes).await?;
        Ok(())
    }

    /// Read a blob or one of its thumbnails.
    ///
    /// # Arguments
    ///
    /// * `blob_id` - The blob id returned by [`BlobStore::write`]
    /// * `width` - A thumbnail width, or `None` for the original
    /// * `name` - The entry's original name, used to infer the content type
    ///
    /// # Returns
    ///
    /// The bytes and their content type, or `NotFound` when the file is
    /// absent on disk
    pub async fn read(&self, blob_id: &str, width: Option<u32>, name: &str) -> Result<Blob> {
        let bytes = match fs::read(self.path_for(blob_id, width)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FileboxError::NotFound),
            Err(e) => return Err(e.into()),
        };

        Ok(Blob {
            bytes,
            content_type: content_type_for(name),
        })
    }

    /// Delete a blob and any thumbnails derived from it.
    ///
    /// # Returns
    ///
    /// `true` if the original was deleted, `false` if it didn't exist
    pub async fn remove(&self, blob_id: &str) -> Result<bool> {
        for width in THUMBNAIL_WIDTHS {
            match fs::remove_file(self.path_for(blob_id, Some(width))).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        match fs::remove_file(self.path_for(blob_id, None)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether a blob or thumbnail is on disk.
    pub async fn exists(&self, blob_id: &str, width: Option<u32>) -> bool {
        fs::try_exists(self.path_for(blob_id, width))
            .await
            .unwrap_or(false)
    }
}
