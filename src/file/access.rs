//! Read-access decision for catalog entries.
//!
//! Public entries are readable by anyone; private entries only by their
//! owner. Denials surface as `NotFound` so private entries stay invisible.

use super::FileEntry;
use crate::{FileboxError, Result};

/// Whether `requester` may read `entry`.
pub fn can_read(entry: &FileEntry, requester: Option<i64>) -> bool {
    entry.is_public || requester == Some(entry.user_id)
}

/// Pass `entry` through when readable, otherwise `NotFound`.
pub fn ensure_readable(entry: FileEntry, requester: Option<i64>) -> Result<FileEntry> {
    if can_read(&entry, requester) {
        Ok(entry)
    } else {
        Err(FileboxError::NotFound)
    }
}
