/// Domain error taxonomy
///
/// Every store and service in this crate returns [`Result`]. The API layer
/// recovers these at the handler boundary and turns them into a redirect with
/// a notice (form submissions) or an HTTP status (JSON pages).
///
/// # Storage mapping
///
/// `sqlx` errors are folded into the taxonomy so callers never match on driver
/// types:
///
/// - unique violation on `users_email_key` → [`Error::DuplicateEmail`]
/// - unique violation on `users_username_key` → [`Error::DuplicateUsername`]
/// - foreign key violation on `tasks_user_id_fkey` → [`Error::NotFound`]`("user")`
/// - anything else → [`Error::Storage`]

use crate::auth::{password::PasswordError, session::SessionError};

/// Result alias used across the shared crate
pub type Result<T> = std::result::Result<T, Error>;

/// Domain errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field was empty or malformed
    #[error("{0}")]
    Validation(String),

    /// Another account already uses this email
    #[error("Email is already registered")]
    DuplicateEmail,

    /// Another account already uses this username
    #[error("Username is already taken")]
    DuplicateUsername,

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authenticated, but not allowed to perform the action
    #[error("Not authorized to perform this action")]
    Unauthorized,

    /// No valid session
    #[error("Authentication required")]
    Unauthenticated,

    /// Current password did not verify during a password change
    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    /// New password and its confirmation differ
    #[error("New passwords do not match")]
    PasswordMismatch,

    /// Underlying persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Session token failure
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Error {
    /// Shorthand for [`Error::Validation`]
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("record"),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();

                if db_err.is_unique_violation() {
                    if constraint.contains("email") {
                        return Error::DuplicateEmail;
                    }
                    if constraint.contains("username") {
                        return Error::DuplicateUsername;
                    }
                }
                if db_err.is_foreign_key_violation() && constraint.contains("user_id") {
                    return Error::NotFound("user");
                }

                Error::Storage(format!("Database error: {}", db_err))
            }
            _ => Error::Storage(format!("Database error: {}", err)),
        }
    }
}
