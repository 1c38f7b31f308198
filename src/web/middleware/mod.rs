//! Middleware and extractors for the Filebox API.

mod auth;
mod cors;

pub use auth::{AuthUser, OptionalAuthUser, TOKEN_HEADER};
pub use cors::create_cors_layer;
