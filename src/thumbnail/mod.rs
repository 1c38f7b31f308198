//! Thumbnail pipeline for Filebox.
//!
//! Image uploads enqueue a [`ThumbnailJob`]; a [`ThumbnailWorker`] consumes
//! the queue and stores 500, 250 and 100 pixel wide variants next to the
//! original blob.

mod queue;
mod resize;
mod worker;

pub use queue::{ChannelJobQueue, FailedJob, JobQueue, QueuedJob, SqliteJobQueue, ThumbnailJob};
pub use resize::{thumbnail_dimensions, SourceImage, THUMBNAIL_WIDTHS};
pub use worker::{JobError, JobOutcome, ThumbnailWorker};

use crate::error::ValidationError;

/// Parse the `size` query of a content request.
///
/// Absent means the original; anything else must be a generated width.
pub fn parse_size(raw: Option<&str>) -> std::result::Result<Option<u32>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|width| THUMBNAIL_WIDTHS.contains(width))
        .map(Some)
        .ok_or(ValidationError::InvalidSize)
}
