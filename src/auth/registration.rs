//! User registration for Filebox.

use tracing::info;

use crate::auth::hash_password;
use crate::db::{NewUser, User, UserRepository};
use crate::error::ValidationError;
use crate::Result;

/// Registration request data.
///
/// Both fields are optional so that absence can be reported with the
/// matching validation message rather than a decode failure.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    /// Login email.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
}

impl RegistrationRequest {
    /// Create a new registration request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Register a new user.
///
/// Checks, in order: email present, password present, email not taken.
/// The password is stored only as an Argon2id hash.
pub async fn register(repo: &UserRepository<'_>, request: RegistrationRequest) -> Result<User> {
    let email = present(request.email).ok_or(ValidationError::MissingField("email"))?;
    let password = present(request.password).ok_or(ValidationError::MissingField("password"))?;

    if repo.email_exists(&email).await? {
        return Err(ValidationError::AlreadyExists.into());
    }

    let password_hash = hash_password(&password)?;

    let user = match repo.create(&NewUser::new(&email, password_hash)).await {
        Ok(user) => user,
        Err(e) => {
            // A concurrent registration may win the UNIQUE race.
            if repo.email_exists(&email).await.unwrap_or(false) {
                info!(error = %e, "Registration lost race for existing email");
                return Err(ValidationError::AlreadyExists.into());
            }
            return Err(e);
        }
    };

    info!(user_id = user.id, "Registered new user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::{Database, FileboxError};

    #[tokio::test]
    async fn test_register_success() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let user = register(&repo, RegistrationRequest::new("bob@dylan.com", "toto1234!"))
            .await
            .unwrap();

        assert_eq!(user.email, "bob@dylan.com");
        assert_ne!(user.password, "toto1234!");
        assert!(verify_password("toto1234!", &user.password).is_ok());
    }

    #[tokio::test]
    async fn test_register_missing_email() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let request = RegistrationRequest {
            email: None,
            password: Some("secret".into()),
        };
        let err = register(&repo, request).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing email");
    }

    #[tokio::test]
    async fn test_register_missing_password_checked_after_email() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        let request = RegistrationRequest {
            email: Some("a@b.c".into()),
            password: Some(String::new()),
        };
        let err = register(&repo, request).await.unwrap_err();
        assert!(matches!(
            err,
            FileboxError::Validation(ValidationError::MissingField("password"))
        ));

        let err = register(&repo, RegistrationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing email");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());

        register(&repo, RegistrationRequest::new("a@b.c", "one"))
            .await
            .unwrap();
        let err = register(&repo, RegistrationRequest::new("a@b.c", "two"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Already exist");
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
