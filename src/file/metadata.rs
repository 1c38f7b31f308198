//! File catalog records and repository for Filebox.

use std::fmt;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::DbPool;
use crate::error::ValidationError;
use crate::Result;

/// Number of entries per listing page.
pub const PAGE_SIZE: i64 = 20;

const COLUMNS: &str = "id, user_id, name, type, is_public, parent_id, blob_id, created_at";

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Folder,
    File,
    Image,
}

impl FileType {
    /// Wire and storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Folder => "folder",
            FileType::File => "file",
            FileType::Image => "image",
        }
    }

    /// Whether entries of this type carry a blob.
    pub fn has_content(&self) -> bool {
        !matches!(self, FileType::Folder)
    }
}

impl FromStr for FileType {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "folder" => Ok(FileType::Folder),
            "file" => Ok(FileType::File),
            "image" => Ok(FileType::Image),
            _ => Err(ValidationError::InvalidType),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parent of a catalog entry: the root, or a folder id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParentRef {
    #[default]
    Root,
    Node(i64),
}

impl ParentRef {
    /// Parse the wire form. Absent, empty and `0` mean root; anything else
    /// must be an id.
    pub fn parse(raw: Option<&str>) -> std::result::Result<Self, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") | Some("0") => Ok(ParentRef::Root),
            Some(s) => match s.parse::<i64>() {
                Ok(0) => Ok(ParentRef::Root),
                Ok(id) => Ok(ParentRef::Node(id)),
                Err(_) => Err(ValidationError::ParentNotFound),
            },
        }
    }

    /// Folder id, or `None` for root.
    pub fn id(&self) -> Option<i64> {
        match self {
            ParentRef::Root => None,
            ParentRef::Node(id) => Some(*id),
        }
    }

    /// Id as rendered to clients, with `0` standing for root.
    pub fn wire_id(&self) -> i64 {
        self.id().unwrap_or(0)
    }
}

impl From<Option<i64>> for ParentRef {
    fn from(id: Option<i64>) -> Self {
        id.map_or(ParentRef::Root, ParentRef::Node)
    }
}

/// A folder, file or image in a user's namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub file_type: FileType,
    pub is_public: bool,
    pub parent: ParentRef,
    /// Blob name in the blob store; `None` only for folders.
    pub blob_id: Option<String>,
    pub created_at: String,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for FileEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let type_name: String = row.try_get("type")?;
        let file_type = type_name
            .parse::<FileType>()
            .map_err(|_| sqlx::Error::ColumnDecode {
                index: "type".to_string(),
                source: format!("unknown file type '{type_name}'").into(),
            })?;
        let parent_id: Option<i64> = row.try_get("parent_id")?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            file_type,
            is_public: row.try_get("is_public")?,
            parent: parent_id.into(),
            blob_id: row.try_get("blob_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Data for inserting a catalog entry.
#[derive(Debug, Clone)]
pub struct NewFileEntry {
    pub user_id: i64,
    pub name: String,
    pub file_type: FileType,
    pub is_public: bool,
    pub parent: ParentRef,
    pub blob_id: Option<String>,
}

/// Repository for catalog rows.
pub struct FileRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert an entry and return the stored record.
    ///
    /// The parent is stored as given; callers check that it is a folder.
    /// Fails when the owner does not exist.
    pub async fn create(&self, entry: &NewFileEntry) -> Result<FileEntry> {
        let sql = format!(
            "INSERT INTO files (user_id, name, type, is_public, parent_id, blob_id)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, FileEntry>(&sql)
            .bind(entry.user_id)
            .bind(&entry.name)
            .bind(entry.file_type.as_str())
            .bind(entry.is_public)
            .bind(entry.parent.id())
            .bind(&entry.blob_id)
            .fetch_one(self.pool)
            .await?;
        Ok(created)
    }

    /// Get an entry by id, regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileEntry>> {
        let sql = format!("SELECT {COLUMNS} FROM files WHERE id = ?");
        let entry = sqlx::query_as::<_, FileEntry>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// Get an entry by id and owner.
    pub async fn get_owned(&self, user_id: i64, id: i64) -> Result<Option<FileEntry>> {
        let sql = format!("SELECT {COLUMNS} FROM files WHERE id = ? AND user_id = ?");
        let entry = sqlx::query_as::<_, FileEntry>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// List an owner's entries in ascending id order.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Owner whose entries are listed
    /// * `parent` - Folder id to filter on; `None` applies no parent filter
    /// * `limit` - Maximum number of entries
    /// * `offset` - Number of matching entries to skip
    ///
    /// # Returns
    ///
    /// At most `limit` entries, oldest first
    pub async fn list(
        &self,
        user_id: i64,
        parent: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FileEntry>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM files
             WHERE user_id = ? AND (? IS NULL OR parent_id = ?)
             ORDER BY id
             LIMIT ? OFFSET ?"
        );
        let entries = sqlx::query_as::<_, FileEntry>(&sql)
            .bind(user_id)
            .bind(parent)
            .bind(parent)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;
        Ok(entries)
    }

    /// Set the visibility flag on an owned entry in one statement.
    pub async fn set_visibility(
        &self,
        user_id: i64,
        id: i64,
        is_public: bool,
    ) -> Result<Option<FileEntry>> {
        let sql = format!(
            "UPDATE files SET is_public = ? WHERE id = ? AND user_id = ? RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, FileEntry>(&sql)
            .bind(is_public)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// Count all entries.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
