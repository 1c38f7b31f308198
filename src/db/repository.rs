//! User repository for Filebox.

use super::user::{NewUser, User};
use super::DbPool;
use crate::{FileboxError, Result};

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a user and return the stored record.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO users (email, password) VALUES (?, ?) RETURNING id")
                .bind(&new_user.email)
                .bind(&new_user.password)
                .fetch_one(self.pool)
                .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FileboxError::Database(format!("user {id} vanished after insert")))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by email (exact match).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Check whether an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("bob@dylan.com", "hash"))
            .await
            .unwrap();
        assert_eq!(user.email, "bob@dylan.com");
        assert_eq!(user.password, "hash");

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "bob@dylan.com");

        let by_email = repo.get_by_email("bob@dylan.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(repo.get_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        repo.create(&NewUser::new("a@b.c", "h1")).await.unwrap();
        let result = repo.create(&NewUser::new("a@b.c", "h2")).await;

        assert!(matches!(result, Err(FileboxError::Database(_))));
    }

    #[tokio::test]
    async fn test_email_exists_and_count() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(!repo.email_exists("a@b.c").await.unwrap());

        repo.create(&NewUser::new("a@b.c", "h")).await.unwrap();
        repo.create(&NewUser::new("d@e.f", "h")).await.unwrap();

        assert!(repo.email_exists("a@b.c").await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
