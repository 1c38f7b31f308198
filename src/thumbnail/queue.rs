//! Thumbnail job queue.
//!
//! Jobs are consumed strictly FIFO by a single worker. Failed jobs are kept
//! with their error text; nothing is retried.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::db::DbPool;
use crate::{FileboxError, Result};

/// Request to derive thumbnails for one image.
///
/// Both ids are optional on the wire; the worker rejects incomplete jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailJob {
    pub user_id: Option<i64>,
    pub file_id: Option<i64>,
}

impl ThumbnailJob {
    pub fn new(user_id: i64, file_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            file_id: Some(file_id),
        }
    }
}

/// A job claimed from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    pub id: i64,
    pub job: ThumbnailJob,
}

/// A job that ended in failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedJob {
    pub id: i64,
    pub job: ThumbnailJob,
    pub error: String,
}

/// Producer/consumer interface between uploads and the thumbnail worker.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a job; returns its id.
    async fn enqueue(&self, job: ThumbnailJob) -> Result<i64>;

    /// Claim the oldest pending job, if any. Does not wait.
    async fn next(&self) -> Result<Option<QueuedJob>>;

    /// Mark a claimed job as done.
    async fn complete(&self, id: i64) -> Result<()>;

    /// Mark a claimed job as terminally failed.
    async fn fail(&self, id: i64, error: &str) -> Result<()>;

    /// Failed jobs, oldest first.
    async fn failures(&self) -> Result<Vec<FailedJob>>;
}

/// Queue persisted in the `thumbnail_jobs` table.
///
/// Survives restarts and can be shared between the API server and a
/// separate worker process through the same database file.
#[derive(Clone)]
pub struct SqliteJobQueue {
    pool: DbPool,
}

impl SqliteJobQueue {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of jobs waiting to be claimed.
    pub async fn pending(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM thumbnail_jobs WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn finish(&self, id: i64, status: &str, error: Option<&str>) -> Result<()> {
        let result = sqlx::query(
            "UPDATE thumbnail_jobs
             SET status = ?, error = ?, finished_at = datetime('now')
             WHERE id = ? AND status = 'running'",
        )
        .bind(status)
        .bind(error)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(FileboxError::Queue(format!("job {id} is not running")));
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for SqliteJobQueue {
    async fn enqueue(&self, job: ThumbnailJob) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO thumbnail_jobs (user_id, file_id) VALUES (?, ?) RETURNING id",
        )
        .bind(job.user_id)
        .bind(job.file_id)
        .fetch_one(&self.pool)
        .await?;
        debug!(job_id = id, "Thumbnail job enqueued");
        Ok(id)
    }

    async fn next(&self) -> Result<Option<QueuedJob>> {
        // Claim and mark in one statement so two consumers never share a job.
        let row: Option<(i64, Option<i64>, Option<i64>)> = sqlx::query_as(
            "UPDATE thumbnail_jobs SET status = 'running'
             WHERE id = (
                 SELECT id FROM thumbnail_jobs WHERE status = 'pending' ORDER BY id LIMIT 1
             )
             RETURNING id, user_id, file_id",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, user_id, file_id)| QueuedJob {
            id,
            job: ThumbnailJob { user_id, file_id },
        }))
    }

    async fn complete(&self, id: i64) -> Result<()> {
        self.finish(id, "completed", None).await
    }

    async fn fail(&self, id: i64, error: &str) -> Result<()> {
        self.finish(id, "failed", Some(error)).await
    }

    async fn failures(&self) -> Result<Vec<FailedJob>> {
        let rows: Vec<(i64, Option<i64>, Option<i64>, Option<String>)> = sqlx::query_as(
            "SELECT id, user_id, file_id, error FROM thumbnail_jobs
             WHERE status = 'failed' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, file_id, error)| FailedJob {
                id,
                job: ThumbnailJob { user_id, file_id },
                error: error.unwrap_or_default(),
            })
            .collect())
    }
}

/// In-process queue over a tokio channel. Nothing is persisted.
pub struct ChannelJobQueue {
    tx: mpsc::UnboundedSender<QueuedJob>,
    rx: Mutex<mpsc::UnboundedReceiver<QueuedJob>>,
    next_id: AtomicI64,
    running: Mutex<HashMap<i64, ThumbnailJob>>,
    failed: Mutex<Vec<FailedJob>>,
}

impl ChannelJobQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            next_id: AtomicI64::new(1),
            running: Mutex::new(HashMap::new()),
            failed: Mutex::new(Vec::new()),
        }
    }
}

impl Default for ChannelJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job: ThumbnailJob) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.tx
            .send(QueuedJob { id, job })
            .map_err(|_| FileboxError::Queue("job channel closed".to_string()))?;
        Ok(id)
    }

    async fn next(&self) -> Result<Option<QueuedJob>> {
        let queued = match self.rx.lock().await.try_recv() {
            Ok(queued) => queued,
            Err(mpsc::error::TryRecvError::Empty) => return Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(FileboxError::Queue("job channel closed".to_string()))
            }
        };
        self.running
            .lock()
            .await
            .insert(queued.id, queued.job.clone());
        Ok(Some(queued))
    }

    async fn complete(&self, id: i64) -> Result<()> {
        self.running
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| FileboxError::Queue(format!("job {id} is not running")))
    }

    async fn fail(&self, id: i64, error: &str) -> Result<()> {
        let job = self
            .running
            .lock()
            .await
            .remove(&id)
            .ok_or_else(|| FileboxError::Queue(format!("job {id} is not running")))?;
        self.failed.lock().await.push(FailedJob {
            id,
            job,
            error: error.to_string(),
        });
        Ok(())
    }

    async fn failures(&self) -> Result<Vec<FailedJob>> {
        Ok(self.failed.lock().await.clone())
    }
}
