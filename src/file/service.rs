//! File catalog service.
//!
//! Ties catalog rows, blob storage and the thumbnail queue together. This is
//! the only writer of catalog entries.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{error, info, warn};

use super::metadata::{FileEntry, FileRepository, FileType, NewFileEntry, ParentRef, PAGE_SIZE};
use super::storage::{Blob, BlobStore};
use crate::db::DbPool;
use crate::error::ValidationError;
use crate::thumbnail::{JobQueue, ThumbnailJob};
use crate::{FileboxError, Result};

/// Upload request as received from a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewUpload {
    pub name: Option<String>,
    /// Raw type string; validated against folder/file/image.
    pub file_type: Option<String>,
    /// Raw parent id; absent, empty or `0` is root.
    pub parent_id: Option<String>,
    pub is_public: bool,
    /// Base64 content; required unless the type is folder.
    pub data: Option<String>,
}

/// File catalog with its blob store and thumbnail producer.
#[derive(Clone)]
pub struct FileCatalog {
    pool: DbPool,
    blobs: BlobStore,
    jobs: Arc<dyn JobQueue>,
}

impl FileCatalog {
    /// Create a catalog over injected store handles.
    pub fn new(pool: DbPool, blobs: BlobStore, jobs: Arc<dyn JobQueue>) -> Self {
        Self { pool, blobs, jobs }
    }

    /// Blob store backing this catalog.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Thumbnail job queue fed by image uploads.
    pub fn jobs(&self) -> &Arc<dyn JobQueue> {
        &self.jobs
    }

    fn repo(&self) -> FileRepository<'_> {
        FileRepository::new(&self.pool)
    }

    /// Validate and store a new entry.
    ///
    /// Checks run in a fixed order: name, type, data, parent. Images get a
    /// thumbnail job once the row is committed.
    pub async fn create(&self, owner: i64, upload: NewUpload) -> Result<FileEntry> {
        let name = upload
            .name
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingField("name"))?;

        let file_type: FileType = upload
            .file_type
            .as_deref()
            .ok_or(ValidationError::InvalidType)?
            .parse()?;

        let data = upload.data.filter(|d| !d.is_empty());
        if file_type.has_content() && data.is_none() {
            return Err(ValidationError::MissingField("data").into());
        }

        let parent = ParentRef::parse(upload.parent_id.as_deref())?;
        if let ParentRef::Node(parent_id) = parent {
            let parent_entry = self
                .repo()
                .get_by_id(parent_id)
                .await?
                .ok_or(ValidationError::ParentNotFound)?;
            if parent_entry.file_type != FileType::Folder {
                return Err(ValidationError::ParentNotFolder.into());
            }
        }

        let blob_id = match data {
            Some(data) if file_type.has_content() => {
                let bytes = decode_payload(&data)?;
                Some(self.blobs.write(&bytes).await?)
            }
            _ => None,
        };

        let created = self
            .repo()
            .create(&NewFileEntry {
                user_id: owner,
                name,
                file_type,
                is_public: upload.is_public,
                parent,
                blob_id: blob_id.clone(),
            })
            .await;
        let entry = match created {
            Ok(entry) => entry,
            Err(e) => {
                if let Some(blob_id) = blob_id {
                    self.discard_blob(&blob_id).await;
                }
                return Err(e);
            }
        };

        info!(
            file_id = entry.id,
            user_id = owner,
            file_type = %entry.file_type,
            "Catalog entry created"
        );

        if entry.file_type == FileType::Image {
            if let Err(e) = self
                .jobs
                .enqueue(ThumbnailJob::new(owner, entry.id))
                .await
            {
                error!(file_id = entry.id, error = %e, "Failed to enqueue thumbnail job");
                return Err(e);
            }
        }

        Ok(entry)
    }

    /// Remove a blob whose catalog row was never written.
    async fn discard_blob(&self, blob_id: &str) {
        match self.blobs.remove(blob_id).await {
            Ok(_) => warn!(blob_id, "Removed blob after failed catalog insert"),
            Err(e) => error!(blob_id, error = %e, "Failed to remove orphaned blob"),
        }
    }

    /// Fetch an entry by id. Access is not checked here.
    pub async fn get(&self, id: i64) -> Result<FileEntry> {
        self.repo().get_by_id(id).await?.ok_or(FileboxError::NotFound)
    }

    /// Fetch an entry by id and owner.
    pub async fn get_owned(&self, owner: i64, id: i64) -> Result<Option<FileEntry>> {
        self.repo().get_owned(owner, id).await
    }

    /// One page of an owner's entries, oldest first.
    ///
    /// `ParentRef::Root` lists every entry of the owner.
    pub async fn list(&self, owner: i64, parent: ParentRef, page: i64) -> Result<Vec<FileEntry>> {
        let offset = page.max(0).saturating_mul(PAGE_SIZE);
        self.repo().list(owner, parent.id(), PAGE_SIZE, offset).await
    }

    /// Set the visibility flag on an owned entry and return the result.
    pub async fn set_visibility(&self, owner: i64, id: i64, is_public: bool) -> Result<FileEntry> {
        let entry = self
            .repo()
            .set_visibility(owner, id, is_public)
            .await?
            .ok_or(FileboxError::NotFound)?;
        info!(file_id = id, is_public, "Visibility changed");
        Ok(entry)
    }

    /// Content of an entry, or of one of its thumbnails.
    pub async fn read_content(&self, entry: &FileEntry, width: Option<u32>) -> Result<Blob> {
        if !entry.file_type.has_content() {
            return Err(ValidationError::FolderHasNoContent.into());
        }
        let blob_id = entry.blob_id.as_deref().ok_or(FileboxError::NotFound)?;
        self.blobs.read(blob_id, width, &entry.name).await
    }

    /// Total number of entries.
    pub async fn count(&self) -> Result<i64> {
        self.repo().count().await
    }
}

fn decode_payload(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|_| ValidationError::InvalidData.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::thumbnail::ChannelJobQueue;
    use crate::Database;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        _db: Database,
        catalog: FileCatalog,
        jobs: Arc<ChannelJobQueue>,
        alice: i64,
    }

    async fn setup() -> Fixture {
        let temp = TempDir::new().unwrap();
        let db = Database::open_in_memory().await.unwrap();
        let alice = UserRepository::new(db.pool())
            .create(&NewUser::new("alice@x.com", "h"))
            .await
            .unwrap()
            .id;
        let jobs = Arc::new(ChannelJobQueue::new());
        let catalog = FileCatalog::new(
            db.pool().clone(),
            BlobStore::new(temp.path()),
            jobs.clone(),
        );
        Fixture {
            _temp: temp,
            _db: db,
            catalog,
            jobs,
            alice,
        }
    }

    fn upload(name: &str, file_type: &str, data: Option<&str>) -> NewUpload {
        NewUpload {
            name: Some(name.into()),
            file_type: Some(file_type.into()),
            data: data.map(String::from),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_file_stores_blob() {
        let f = setup().await;

        let entry = f
            .catalog
            .create(f.alice, upload("hello.txt", "file", Some("SGVsbG8gV2Vic3RhY2shCg==")))
            .await
            .unwrap();
        assert_eq!(entry.name, "hello.txt");
        assert_eq!(entry.parent, ParentRef::Root);
        assert!(!entry.is_public);

        let fetched = f.catalog.get(entry.id).await.unwrap();
        assert_eq!(fetched, entry);

        let blob = f.catalog.read_content(&entry, None).await.unwrap();
        assert_eq!(blob.bytes, b"Hello Webstack!\n");
        assert_eq!(blob.content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_blob() {
        let fx = setup().await;

        // No such user: the row violates the owner foreign key.
        let result = fx
            .catalog
            .create(9999, upload("a.txt", "file", Some("aGVsbG8=")))
            .await;
        assert!(result.is_err());

        let stored = std::fs::read_dir(fx._temp.path()).unwrap().count();
        assert_eq!(stored, 0);
        assert_eq!(fx.catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_folder_has_no_blob() {
        let f = setup().await;

        let entry = f
            .catalog
            .create(f.alice, upload("Docs", "folder", None))
            .await
            .unwrap();
        assert!(entry.blob_id.is_none());

        let err = f.catalog.read_content(&entry, None).await.unwrap_err();
        assert_eq!(err.to_string(), "A folder doesn't have content");
    }

    #[tokio::test]
    async fn test_validation_order() {
        let f = setup().await;

        let err = f
            .catalog
            .create(f.alice, NewUpload::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing name");

        let err = f
            .catalog
            .create(f.alice, upload("a", "video", None))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing or invalid type");

        let mut missing_data = upload("a", "file", None);
        missing_data.parent_id = Some("999".into());
        let err = f.catalog.create(f.alice, missing_data).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing data");

        let err = f
            .catalog
            .create(f.alice, upload("a", "file", Some("***")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid data");
    }

    #[tokio::test]
    async fn test_parent_checks() {
        let f = setup().await;
        let file = f
            .catalog
            .create(f.alice, upload("a.txt", "file", Some("YQ==")))
            .await
            .unwrap();

        let mut under_file = upload("b", "folder", None);
        under_file.parent_id = Some(file.id.to_string());
        let err = f.catalog.create(f.alice, under_file).await.unwrap_err();
        assert_eq!(err.to_string(), "Parent is not a folder");

        let mut missing_parent = upload("b", "folder", None);
        missing_parent.parent_id = Some("424242".into());
        let err = f.catalog.create(f.alice, missing_parent).await.unwrap_err();
        assert_eq!(err.to_string(), "Parent not found");

        let mut garbage_parent = upload("b", "folder", None);
        garbage_parent.parent_id = Some("not-an-id".into());
        let err = f.catalog.create(f.alice, garbage_parent).await.unwrap_err();
        assert_eq!(err.to_string(), "Parent not found");
    }

    #[tokio::test]
    async fn test_image_upload_enqueues_job() {
        let f = setup().await;

        let file = f
            .catalog
            .create(f.alice, upload("a.txt", "file", Some("YQ==")))
            .await
            .unwrap();
        let image = f
            .catalog
            .create(f.alice, upload("pic.png", "image", Some("iVBORw0KGgo=")))
            .await
            .unwrap();
        assert_ne!(file.id, image.id);

        let queued = f.jobs.next().await.unwrap().unwrap();
        assert_eq!(queued.job, ThumbnailJob::new(f.alice, image.id));
        assert!(f.jobs.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visibility_round_trip() {
        let f = setup().await;
        let entry = f
            .catalog
            .create(f.alice, upload("Docs", "folder", None))
            .await
            .unwrap();

        let published = f.catalog.set_visibility(f.alice, entry.id, true).await.unwrap();
        assert!(published.is_public);
        let again = f.catalog.set_visibility(f.alice, entry.id, true).await.unwrap();
        assert!(again.is_public);
        assert!(f.catalog.get(entry.id).await.unwrap().is_public);

        let err = f
            .catalog
            .set_visibility(f.alice + 1, entry.id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, FileboxError::NotFound));
    }

    #[tokio::test]
    async fn test_list_negative_page_is_first_page() {
        let f = setup().await;
        f.catalog
            .create(f.alice, upload("Docs", "folder", None))
            .await
            .unwrap();

        let page = f.catalog.list(f.alice, ParentRef::Root, -3).await.unwrap();
        assert_eq!(page.len(), 1);
        assert!(f.catalog.list(f.alice, ParentRef::Root, 1).await.unwrap().is_empty());
        assert_eq!(f.catalog.count().await.unwrap(), 1);
    }
}
