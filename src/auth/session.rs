//! Session token store for Filebox.
//!
//! Tokens are UUID v4 strings persisted as `auth_<token>` rows with an
//! absolute expiry. Expiry is enforced by the lookup query itself; the
//! periodic purge only reclaims space.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{verify_password, verify_unknown_account};
use crate::db::{DbPool, UserRepository};
use crate::{FileboxError, Result};

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Storage key for a session token.
pub fn session_key(token: &str) -> String {
    format!("auth_{token}")
}

/// Parse an `Authorization: Basic <base64(email:password)>` header value.
///
/// The decoded pair is split at the first `:`, so passwords may contain
/// colons. Every malformed shape yields `Unauthorized`.
pub fn parse_basic_credentials(header: &str) -> Result<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(FileboxError::Unauthorized)?
        .trim();

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| FileboxError::Unauthorized)?;
    let credentials = String::from_utf8(decoded).map_err(|_| FileboxError::Unauthorized)?;

    let (email, password) = credentials
        .split_once(':')
        .ok_or(FileboxError::Unauthorized)?;

    Ok((email.to_string(), password.to_string()))
}

/// Token to user-id mapping with a fixed time-to-live.
#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store over an injected pool handle.
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check that the backing store answers queries.
    pub async fn ping(&self) -> bool {
        !self.pool.is_closed()
            && sqlx::query("SELECT 1 FROM sessions LIMIT 1")
                .execute(&self.pool)
                .await
                .is_ok()
    }

    /// Log in with a Basic credentials header and mint a fresh token.
    ///
    /// Absent header, bad encoding, unknown email and wrong password all
    /// produce the same `Unauthorized`.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<String> {
        let (email, password) = parse_basic_credentials(header.ok_or(FileboxError::Unauthorized)?)?;

        let Some(user) = UserRepository::new(&self.pool).get_by_email(&email).await? else {
            // Same Argon2 cost as a wrong password.
            let _ = verify_unknown_account(&password);
            debug!("Login for unknown account");
            return Err(FileboxError::Unauthorized);
        };

        if verify_password(&password, &user.password).is_err() {
            debug!(user_id = user.id, "Password verification failed");
            return Err(FileboxError::Unauthorized);
        }

        let token = self.create(user.id).await?;
        info!(user_id = user.id, "User connected");
        Ok(token)
    }

    /// Store a new token for `user_id` and return it.
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| FileboxError::Config(format!("session ttl: {e}")))?;
        let expires_at = (Utc::now() + ttl).format("%Y-%m-%d %H:%M:%S").to_string();

        sqlx::query("INSERT INTO sessions (key, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(session_key(&token))
            .bind(user_id)
            .bind(&expires_at)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Look up the user behind a token. Never extends the expiry.
    pub async fn resolve(&self, token: &str) -> Result<Option<i64>> {
        let user_id: Option<i64> = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE key = ? AND expires_at > datetime('now')",
        )
        .bind(session_key(token))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    /// Delete a token. Returns whether a mapping was removed.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE key = ?")
            .bind(session_key(token))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired rows. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}
