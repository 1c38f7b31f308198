//! HTTP surface for Filebox.
//!
//! A thin axum layer over the session store, the file catalog and the
//! access decision. All responses are JSON wrapped in `{ "data": ... }`
//! except raw content from `/files/:id/data`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
