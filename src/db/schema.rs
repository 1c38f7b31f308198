//! Database schema and migrations for Filebox.
//!
//! Migrations are applied in order; `schema_version` records which ones ran.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- Argon2 PHC hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: file catalog
    r#"
CREATE TABLE files (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    name        TEXT NOT NULL,
    type        TEXT NOT NULL CHECK (type IN ('folder', 'file', 'image')),
    is_public   INTEGER NOT NULL DEFAULT 0,
    parent_id   INTEGER REFERENCES files(id),   -- NULL = root
    blob_id     TEXT,                           -- NULL only for folders
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK ((type = 'folder') = (blob_id IS NULL))
);

CREATE INDEX idx_files_user_id ON files(user_id, id);
CREATE INDEX idx_files_user_parent ON files(user_id, parent_id, id);
"#,
    // v3: sessions, keyed as auth_<token>
    r#"
CREATE TABLE sessions (
    key         TEXT PRIMARY KEY,
    user_id     INTEGER NOT NULL,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
    // v4: thumbnail job queue
    r#"
CREATE TABLE thumbnail_jobs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER,                           -- NULL = malformed job, failed by the worker
    file_id     INTEGER,
    status      TEXT NOT NULL DEFAULT 'pending',   -- pending, running, completed, failed
    error       TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    finished_at TEXT
);

CREATE INDEX idx_thumbnail_jobs_status ON thumbnail_jobs(status, id);
"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_valid_sql() {
        assert!(!MIGRATIONS.is_empty());
        for migration in MIGRATIONS {
            assert!(!migration.trim().is_empty());
            assert!(migration.contains("CREATE TABLE"));
        }
    }

    #[test]
    fn test_files_migration_columns() {
        let files = MIGRATIONS[1];
        for column in ["user_id", "name", "type", "is_public", "parent_id", "blob_id"] {
            assert!(files.contains(column), "files table lacks {column}");
        }
    }
}
