//! Authentication module for Filebox.
//!
//! Password hashing, user registration and the session token store.

mod password;
mod registration;
mod session;

pub use password::{hash_password, verify_password, verify_unknown_account, PasswordError};
pub use registration::{register, RegistrationRequest};
pub use session::{
    parse_basic_credentials, session_key, SessionStore, DEFAULT_SESSION_TTL_SECS,
};
