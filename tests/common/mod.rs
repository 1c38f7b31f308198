//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tempfile::TempDir;

use filebox::web::create_router;
use filebox::{AppState, BlobStore, Database, JobQueue, SqliteJobQueue, ThumbnailWorker};

/// Body limit used by test routers.
pub const TEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// A router over an in-memory database and a temporary blob root.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub jobs: Arc<SqliteJobQueue>,
    pub blob_dir: TempDir,
}

impl TestApp {
    /// Worker over the same catalog and queue as the router.
    pub fn worker(&self) -> ThumbnailWorker {
        let jobs: Arc<dyn JobQueue> = self.jobs.clone();
        ThumbnailWorker::new(
            self.state.catalog.clone(),
            jobs,
            Duration::from_millis(10),
        )
    }
}

/// Create a test app with an in-memory database.
pub async fn create_test_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let blob_dir = TempDir::new().expect("Failed to create blob dir");
    let jobs = Arc::new(SqliteJobQueue::new(db.pool().clone()));

    let state = Arc::new(AppState::new(
        db,
        BlobStore::new(blob_dir.path()),
        jobs.clone(),
        Duration::from_secs(24 * 60 * 60),
    ));

    let router = create_router(state.clone(), &[], TEST_BODY_LIMIT);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        jobs,
        blob_dir,
    }
}

/// `X-Token` header name.
pub fn x_token() -> HeaderName {
    HeaderName::from_static("x-token")
}

/// Header value for a token.
pub fn token_value(token: &str) -> HeaderValue {
    HeaderValue::from_str(token).expect("token is a valid header value")
}

/// `Authorization: Basic` value for a credential pair.
pub fn basic_auth(email: &str, password: &str) -> HeaderValue {
    let encoded = STANDARD.encode(format!("{email}:{password}"));
    HeaderValue::from_str(&format!("Basic {encoded}")).expect("valid header value")
}

/// Register a user and return the created user's id.
pub async fn register_user(server: &TestServer, email: &str, password: &str) -> i64 {
    let response = server
        .post("/users")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("user id")
}

/// Log in and return the session token.
pub async fn connect(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .get("/connect")
        .add_header(axum::http::header::AUTHORIZATION, basic_auth(email, password))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"]["token"]
        .as_str()
        .expect("token")
        .to_string()
}

/// Register then log in.
pub async fn register_and_connect(server: &TestServer, email: &str, password: &str) -> String {
    register_user(server, email, password).await;
    connect(server, email, password).await
}

/// Create an entry and return the response body's `data`.
pub async fn upload(server: &TestServer, token: &str, body: Value) -> Value {
    let response = server
        .post("/files")
        .add_header(x_token(), token_value(token))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

/// Encoded test image.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 120])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .expect("encode test image");
    out.into_inner()
}

/// Base64 of a PNG test image.
pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(image_bytes(width, height, ImageFormat::Png))
}
