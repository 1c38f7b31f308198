//! API handlers for Filebox.

pub mod app;
pub mod auth;
pub mod file;
pub mod user;

pub use app::*;
pub use auth::*;
pub use file::*;
pub use user::*;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionStore;
use crate::db::UserRepository;
use crate::file::{BlobStore, FileCatalog};
use crate::thumbnail::JobQueue;
use crate::Database;

/// Application state shared across handlers.
///
/// Every store handle is constructed by the process owner and injected here.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub catalog: FileCatalog,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        blobs: BlobStore,
        jobs: Arc<dyn JobQueue>,
        session_ttl: Duration,
    ) -> Self {
        let sessions = SessionStore::new(db.pool().clone(), session_ttl);
        let catalog = FileCatalog::new(db.pool().clone(), blobs, jobs);
        Self {
            db,
            sessions,
            catalog,
        }
    }

    /// User repository over the shared pool.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }
}
