//! Password hashing for Filebox.
//!
//! Uses Argon2id; hashes are PHC strings carrying their own salt and params.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use std::sync::OnceLock;

use rand_core::OsRng;
use thiserror::Error;

/// Hash checked against when a login names no known account.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

/// Create the Argon2id hasher.
///
/// Parameters follow the OWASP minimum: 19 MiB memory, 2 iterations,
/// 1 lane. Login sits on the request path, so the cost is kept moderate.
fn create_argon2() -> Argon2<'static> {
    let params = Params::new(19_456, 2, 1, None).unwrap_or_default();
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a password using Argon2id.
///
/// ```
/// let hash = filebox::hash_password("toto1234!").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    // Params come from the parsed hash, not from create_argon2().
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Run a full verification for a login whose account does not exist.
///
/// Uses a fixed hash with the same parameters as stored ones, so unknown
/// accounts cost the same Argon2 work as a wrong password. Always fails.
pub fn verify_unknown_account(password: &str) -> Result<(), PasswordError> {
    let dummy = DUMMY_HASH.get_or_init(|| hash_password("filebox-unknown-account").ok());
    match dummy {
        Some(hash) => {
            verify_password(password, hash)?;
            Err(PasswordError::VerificationFailed)
        }
        None => {
            hash_password(password)?;
            Err(PasswordError::VerificationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("toto1234!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("$v=19$"));
        assert!(hash.contains("m=19456,t=2,p=1"));
    }

    #[test]
    fn test_hash_password_salted() {
        let hash1 = hash_password("same").unwrap();
        let hash2 = hash_password("same").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct").unwrap();

        assert!(verify_password("correct", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(PasswordError::VerificationFailed)
        ));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        // Legacy unsalted digests are not accepted.
        let sha1_hex = "89cad29e3ebc1035b29b1478a8e70854f25fa2b2";
        assert!(matches!(
            verify_password("toto1234!", sha1_hex),
            Err(PasswordError::InvalidHash)
        ));
    }

    #[test]
    fn test_verify_unknown_account_runs_full_verification() {
        for password in ["", "toto1234!", "filebox-unknown-account"] {
            assert!(matches!(
                verify_unknown_account(password),
                Err(PasswordError::VerificationFailed)
            ));
        }

        let dummy = DUMMY_HASH.get().cloned().flatten().unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        assert!(dummy.contains("m=19456,t=2,p=1"));
    }
}
