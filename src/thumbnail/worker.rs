//! Thumbnail worker: the single consumer of the job queue.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::queue::{JobQueue, ThumbnailJob};
use super::resize::{SourceImage, THUMBNAIL_WIDTHS};
use crate::file::FileCatalog;
use crate::{FileboxError, Result};

/// Why a job failed. The display text is what the queue records.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Missing fileId")]
    MissingFileId,

    #[error("Missing userId")]
    MissingUserId,

    #[error("File not found")]
    FileNotFound,

    #[error("File has no stored content")]
    MissingBlob,

    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("thumbnail {width} failed: {reason}")]
    Thumbnail { width: u32, reason: String },

    #[error(transparent)]
    Backend(#[from] FileboxError),
}

/// Result of handling one claimed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { id: i64 },
    Failed { id: i64, error: String },
}

/// Pulls one job at a time and writes the 500/250/100 thumbnails.
pub struct ThumbnailWorker {
    catalog: FileCatalog,
    queue: Arc<dyn JobQueue>,
    poll_interval: Duration,
}

impl ThumbnailWorker {
    pub fn new(catalog: FileCatalog, queue: Arc<dyn JobQueue>, poll_interval: Duration) -> Self {
        Self {
            catalog,
            queue,
            poll_interval,
        }
    }

    /// Generate every thumbnail for one job.
    ///
    /// Stops at the first failing width; thumbnails already written stay.
    pub async fn process(&self, job: &ThumbnailJob) -> std::result::Result<(), JobError> {
        let file_id = job.file_id.ok_or(JobError::MissingFileId)?;
        let user_id = job.user_id.ok_or(JobError::MissingUserId)?;

        let entry = self
            .catalog
            .get_owned(user_id, file_id)
            .await?
            .ok_or(JobError::FileNotFound)?;
        let blob_id = entry.blob_id.clone().ok_or(JobError::MissingBlob)?;

        let original = match self.catalog.read_content(&entry, None).await {
            Ok(blob) => blob.bytes,
            Err(FileboxError::NotFound) => return Err(JobError::MissingBlob),
            Err(e) => return Err(e.into()),
        };

        let source = tokio::task::spawn_blocking(move || SourceImage::decode(&original))
            .await
            .map_err(|e| JobError::Decode(e.to_string()))?
            .map_err(|e| JobError::Decode(e.to_string()))?;
        let source = Arc::new(source);

        for width in THUMBNAIL_WIDTHS {
            let image = Arc::clone(&source);
            let bytes = tokio::task::spawn_blocking(move || image.render(width))
                .await
                .map_err(|e| JobError::Thumbnail {
                    width,
                    reason: e.to_string(),
                })?
                .map_err(|e| JobError::Thumbnail {
                    width,
                    reason: e.to_string(),
                })?;

            self.catalog
                .blobs()
                .write_derived(&blob_id, width, &bytes)
                .await?;
            debug!(file_id, width, "Thumbnail written");
        }

        Ok(())
    }

    /// Claim and handle the next job, if one is waiting.
    pub async fn process_next(&self) -> Result<Option<JobOutcome>> {
        let Some(queued) = self.queue.next().await? else {
            return Ok(None);
        };

        match self.process(&queued.job).await {
            Ok(()) => {
                self.queue.complete(queued.id).await?;
                info!(job_id = queued.id, file_id = ?queued.job.file_id, "Thumbnails generated");
                Ok(Some(JobOutcome::Completed { id: queued.id }))
            }
            Err(e) => {
                let message = e.to_string();
                warn!(job_id = queued.id, error = %message, "Thumbnail job failed");
                self.queue.fail(queued.id, &message).await?;
                Ok(Some(JobOutcome::Failed {
                    id: queued.id,
                    error: message,
                }))
            }
        }
    }

    /// Drain the queue until it is empty. Returns the outcomes in order.
    pub async fn drain(&self) -> Result<Vec<JobOutcome>> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.process_next().await? {
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Run until `shutdown` flips to true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Thumbnail worker started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.process_next().await {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => error!(error = %e, "Thumbnail queue error"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Thumbnail worker stopped");
    }
}
